//! Parameter form for the selected function

mod state;

pub use state::{FieldEntry, FieldValue, FormError, FormState, ParameterFormState};
