// sluice/src/output/sink.rs

use crate::error::SluiceError;
use crate::output::definition::Output;
use crate::transformer::context::TransformerContext;
use serde_json::Value;

/// Writes produced data into one field of a transformer context.
///
/// This is how a helper engine reports back: its first transformer's outputs
/// are replaced by a single sink pointing at the parent transformer.
#[derive(Debug, Clone)]
pub struct ResultSink {
  target: TransformerContext,
  field: String,
}

impl ResultSink {
  pub fn new(target: TransformerContext, field: impl Into<String>) -> Self {
    Self {
      target,
      field: field.into(),
    }
  }

  pub fn field(&self) -> &str {
    &self.field
  }

  pub fn write(&self, data: Value) {
    self.target.write().set_field(self.field.clone(), data);
  }
}

impl From<ResultSink> for Output {
  fn from(sink: ResultSink) -> Self {
    Output::new()
      .with_name(format!("result of '{}'", sink.field()))
      .on_execute(move |data| {
        let sink = sink.clone();
        async move {
          sink.write(data);
          Ok::<(), SluiceError>(())
        }
      })
  }
}
