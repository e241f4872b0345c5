//! Live input state for the parameters of one function

use thiserror::Error;
use tracing::debug;

use crate::domain::abi::{FunctionSignature, ParamKind, ParamSpec};
use crate::modules::toolkit::checksum::{validate_address, AddressValidity};
use crate::modules::toolkit::encode::RawArg;
use crate::modules::toolkit::units::{to_display, to_raw, UnitsError, DEFAULT_DECIMALS, MAX_DECIMALS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown parameter: {0}")]
    UnknownParam(String),
    #[error("index {index} out of range for '{name}' ({len} elements)")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
    #[error("'{0}' is not an array parameter")]
    NotAnArray(String),
    #[error("'{0}' is an array parameter, set its elements instead")]
    NotAScalar(String),
    #[error("'{0}' is not a numeric parameter")]
    NotNumeric(String),
    #[error("decimal scale {0} is too large (max 77)")]
    ScaleTooLarge(u8),
}

/// One input box: what the user typed and what gets encoded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldEntry {
    pub display: String,
    pub raw: String,
    pub validity: AddressValidity,
    /// Last coercion failure; blocks encoding until the input parses again
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(FieldEntry),
    Array(Vec<FieldEntry>),
}

impl FieldValue {
    pub fn entries(&self) -> &[FieldEntry] {
        match self {
            FieldValue::Scalar(entry) => std::slice::from_ref(entry),
            FieldValue::Array(entries) => entries,
        }
    }

    fn entries_mut(&mut self) -> &mut [FieldEntry] {
        match self {
            FieldValue::Scalar(entry) => std::slice::from_mut(entry),
            FieldValue::Array(entries) => entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFormState {
    pub param: ParamSpec,
    /// Form key; positional `argN` when the parameter is unnamed
    pub key: String,
    pub kind: ParamKind,
    pub decimal_scale: u8,
    pub raw_mode: bool,
    pub value: FieldValue,
}

impl ParameterFormState {
    fn new(index: usize, param: &ParamSpec, default_scale: u8) -> Self {
        let kind = param.classify();
        let key = if param.name.trim().is_empty() {
            format!("arg{}", index)
        } else {
            param.name.clone()
        };
        let value = if kind.array {
            FieldValue::Array(vec![FieldEntry::default()])
        } else {
            FieldValue::Scalar(FieldEntry::default())
        };

        Self {
            param: param.clone(),
            key,
            kind,
            decimal_scale: if kind.is_numeric() { default_scale } else { 0 },
            raw_mode: false,
            value,
        }
    }

    pub fn array_len(&self) -> usize {
        match &self.value {
            FieldValue::Scalar(_) => 0,
            FieldValue::Array(entries) => entries.len(),
        }
    }

    /// Whether display input is scaled before encoding
    pub fn is_scaled(&self) -> bool {
        self.kind.is_numeric() && !self.raw_mode
    }

    fn derive(&self, entry: &mut FieldEntry) {
        if self.is_scaled() {
            match to_raw(&entry.display, self.decimal_scale) {
                Ok(raw) => {
                    entry.raw = raw;
                    entry.error = None;
                }
                Err(UnitsError::Empty) => {
                    entry.raw.clear();
                    entry.error = None;
                }
                // Keep the last valid raw value
                Err(e) => entry.error = Some(e.to_string()),
            }
        } else {
            entry.raw = entry.display.clone();
            entry.error = None;
        }

        entry.validity = if self.kind.is_address() {
            validate_address(entry.display.trim())
        } else {
            AddressValidity::NotApplicable
        };
    }

    fn entry_from(&self, display: &str) -> FieldEntry {
        let mut entry = FieldEntry {
            display: display.to_string(),
            ..FieldEntry::default()
        };
        self.derive(&mut entry);
        entry
    }
}

/// Form for the active function, one state per parameter in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    params: Vec<ParameterFormState>,
}

impl FormState {
    pub fn new(function: &FunctionSignature) -> Self {
        Self::with_decimals(function, DEFAULT_DECIMALS)
    }

    /// Fresh form where numeric parameters start at `default_scale`
    pub fn with_decimals(function: &FunctionSignature, default_scale: u8) -> Self {
        let default_scale = default_scale.min(MAX_DECIMALS);
        Self {
            params: function
                .inputs
                .iter()
                .enumerate()
                .map(|(i, p)| ParameterFormState::new(i, p, default_scale))
                .collect(),
        }
    }

    pub fn params(&self) -> &[ParameterFormState] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Result<&ParameterFormState, FormError> {
        self.params
            .iter()
            .find(|p| p.key == name)
            .ok_or_else(|| FormError::UnknownParam(name.to_string()))
    }

    fn param_mut(&mut self, name: &str) -> Result<&mut ParameterFormState, FormError> {
        self.params
            .iter_mut()
            .find(|p| p.key == name)
            .ok_or_else(|| FormError::UnknownParam(name.to_string()))
    }

    /// Update a scalar parameter
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let state = self.param_mut(name)?;
        let entry = state.entry_from(value);
        match &mut state.value {
            FieldValue::Scalar(current) => {
                // A failed coercion keeps the previous raw value
                let raw = if entry.error.is_some() {
                    current.raw.clone()
                } else {
                    entry.raw.clone()
                };
                *current = FieldEntry { raw, ..entry };
            }
            FieldValue::Array(_) => return Err(FormError::NotAScalar(name.to_string())),
        }
        debug!(param = name, value, "form value updated");
        Ok(())
    }

    /// Update one element of an array parameter
    pub fn set_element(&mut self, name: &str, index: usize, value: &str) -> Result<(), FormError> {
        let state = self.param_mut(name)?;
        let entry = state.entry_from(value);
        let FieldValue::Array(entries) = &mut state.value else {
            return Err(FormError::NotAnArray(name.to_string()));
        };
        let len = entries.len();
        let current = entries.get_mut(index).ok_or(FormError::IndexOutOfRange {
            name: name.to_string(),
            index,
            len,
        })?;

        let raw = if entry.error.is_some() {
            current.raw.clone()
        } else {
            entry.raw.clone()
        };
        *current = FieldEntry { raw, ..entry };
        debug!(param = name, index, value, "form element updated");
        Ok(())
    }

    /// Append an empty element
    pub fn add_element(&mut self, name: &str) -> Result<usize, FormError> {
        let state = self.param_mut(name)?;
        let FieldValue::Array(entries) = &mut state.value else {
            return Err(FormError::NotAnArray(name.to_string()));
        };
        entries.push(FieldEntry::default());
        Ok(entries.len())
    }

    /// Remove an element; later elements shift down with their validity
    pub fn remove_element(&mut self, name: &str, index: usize) -> Result<usize, FormError> {
        let state = self.param_mut(name)?;
        let FieldValue::Array(entries) = &mut state.value else {
            return Err(FormError::NotAnArray(name.to_string()));
        };
        if index >= entries.len() {
            return Err(FormError::IndexOutOfRange {
                name: name.to_string(),
                index,
                len: entries.len(),
            });
        }
        entries.remove(index);
        Ok(entries.len())
    }

    /// Replace every element from comma or newline separated text
    pub fn set_array_text(&mut self, name: &str, text: &str) -> Result<usize, FormError> {
        let state = self.param_mut(name)?;
        if !state.kind.array {
            return Err(FormError::NotAnArray(name.to_string()));
        }

        let entries: Vec<FieldEntry> = text
            .split([',', '\n'])
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| state.entry_from(token))
            .collect();
        let len = entries.len();
        state.value = FieldValue::Array(entries);

        debug!(param = name, elements = len, "array replaced from text");
        Ok(len)
    }

    /// Switch between scaled input and raw base-unit input
    ///
    /// Returns the new mode. The value carries over in both directions.
    pub fn toggle_raw_mode(&mut self, name: &str) -> Result<bool, FormError> {
        let state = self.param_mut(name)?;
        if !state.kind.is_numeric() {
            return Err(FormError::NotNumeric(name.to_string()));
        }

        let entering = !state.raw_mode;
        let scale = state.decimal_scale;
        state.raw_mode = entering;

        for entry in state.value.entries_mut() {
            if entering {
                entry.display = entry.raw.clone();
                entry.error = None;
            } else {
                match to_display(&entry.raw, scale) {
                    Ok(display) => {
                        entry.display = display;
                        entry.error = None;
                    }
                    Err(e) => {
                        entry.display = entry.raw.clone();
                        entry.error = Some(e.to_string());
                    }
                }
            }
        }

        debug!(param = name, raw_mode = entering, "raw mode toggled");
        Ok(entering)
    }

    /// Change the decimal scale; values are cleared, array length is kept
    pub fn set_decimal_scale(&mut self, name: &str, scale: u8) -> Result<(), FormError> {
        if scale > MAX_DECIMALS {
            return Err(FormError::ScaleTooLarge(scale));
        }
        let state = self.param_mut(name)?;
        if !state.kind.is_numeric() {
            return Err(FormError::NotNumeric(name.to_string()));
        }

        state.decimal_scale = scale;
        for entry in state.value.entries_mut() {
            *entry = FieldEntry::default();
        }
        debug!(param = name, scale, "decimal scale changed");
        Ok(())
    }

    /// Address validity of a scalar (`index` None) or of one array element
    pub fn address_validity(
        &self,
        name: &str,
        index: Option<usize>,
    ) -> Result<AddressValidity, FormError> {
        let state = self.param(name)?;
        let entry = match (&state.value, index) {
            (FieldValue::Scalar(entry), None) => entry,
            (FieldValue::Scalar(_), Some(_)) => return Err(FormError::NotAnArray(name.to_string())),
            (FieldValue::Array(_), None) => return Err(FormError::NotAScalar(name.to_string())),
            (FieldValue::Array(entries), Some(i)) => {
                entries.get(i).ok_or(FormError::IndexOutOfRange {
                    name: name.to_string(),
                    index: i,
                    len: entries.len(),
                })?
            }
        };
        Ok(entry.validity)
    }

    /// First entry holding a coercion error, as (parameter key, message)
    pub fn first_error(&self) -> Option<(&str, &str)> {
        self.params.iter().find_map(|p| {
            p.value
                .entries()
                .iter()
                .find_map(|e| e.error.as_deref())
                .map(|msg| (p.key.as_str(), msg))
        })
    }

    /// Raw values in declaration order, ready for the encoder
    pub fn raw_args(&self) -> Vec<RawArg> {
        self.params
            .iter()
            .map(|p| match &p.value {
                FieldValue::Scalar(entry) => RawArg::Scalar(entry.raw.clone()),
                FieldValue::Array(entries) => {
                    RawArg::Array(entries.iter().map(|e| e.raw.clone()).collect())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::Mutability;

    fn function(inputs: Vec<ParamSpec>) -> FunctionSignature {
        FunctionSignature::new("f", inputs, vec![], Mutability::StateChanging)
    }

    fn transfer_form() -> FormState {
        FormState::new(&function(vec![
            ParamSpec::new("to", "address"),
            ParamSpec::new("amount", "uint256"),
        ]))
    }

    fn scalar(form: &FormState, name: &str) -> FieldEntry {
        match &form.param(name).unwrap().value {
            FieldValue::Scalar(entry) => entry.clone(),
            FieldValue::Array(_) => panic!("expected scalar"),
        }
    }

    #[test]
    fn test_fresh_state() {
        let form = FormState::new(&function(vec![
            ParamSpec::new("amount", "uint256"),
            ParamSpec::new("owners", "address[]"),
            ParamSpec::new("flag", "bool"),
        ]));

        let amount = form.param("amount").unwrap();
        assert_eq!(amount.decimal_scale, 18);
        assert!(!amount.raw_mode);

        let owners = form.param("owners").unwrap();
        assert_eq!(owners.array_len(), 1);
        assert_eq!(owners.decimal_scale, 0);

        assert_eq!(form.param("flag").unwrap().decimal_scale, 0);
    }

    #[test]
    fn test_numeric_value_is_scaled() {
        let mut form = transfer_form();
        form.set_value("amount", "1.5").unwrap();
        let entry = scalar(&form, "amount");
        assert_eq!(entry.display, "1.5");
        assert_eq!(entry.raw, "1500000000000000000");
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_unparseable_keeps_last_raw() {
        let mut form = transfer_form();
        form.set_value("amount", "2").unwrap();
        form.set_value("amount", "2.x").unwrap();

        let entry = scalar(&form, "amount");
        assert_eq!(entry.display, "2.x");
        assert_eq!(entry.raw, "2000000000000000000");
        assert!(entry.error.is_some());
        assert_eq!(form.first_error().map(|(k, _)| k), Some("amount"));

        form.set_value("amount", "").unwrap();
        assert_eq!(scalar(&form, "amount").raw, "");
        assert!(form.first_error().is_none());
    }

    #[test]
    fn test_address_validity_tracked() {
        let mut form = transfer_form();
        form.set_value("to", "0x1234").unwrap();
        assert_eq!(
            form.address_validity("to", None).unwrap(),
            AddressValidity::Invalid
        );

        form.set_value("to", "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359")
            .unwrap();
        assert_eq!(
            form.address_validity("to", None).unwrap(),
            AddressValidity::Valid
        );
        // Non-address values are passed through verbatim
        assert_eq!(scalar(&form, "to").raw, "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");
    }

    #[test]
    fn test_array_elements() {
        let mut form = FormState::new(&function(vec![ParamSpec::new("owners", "address[]")]));
        let good = format!("0x{}", "ab".repeat(20));

        form.set_element("owners", 0, "0x12").unwrap();
        assert_eq!(form.add_element("owners").unwrap(), 2);
        form.set_element("owners", 1, &good).unwrap();
        form.add_element("owners").unwrap();

        form.remove_element("owners", 0).unwrap();
        assert_eq!(form.param("owners").unwrap().array_len(), 2);
        // The valid element moved down with its validity
        assert_eq!(
            form.address_validity("owners", Some(0)).unwrap(),
            AddressValidity::Valid
        );
        assert_eq!(
            form.address_validity("owners", Some(1)).unwrap(),
            AddressValidity::NotApplicable
        );

        assert!(matches!(
            form.set_element("owners", 5, "x"),
            Err(FormError::IndexOutOfRange { index: 5, len: 2, .. })
        ));
        assert!(matches!(
            form.remove_element("owners", 2),
            Err(FormError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_array_text_mode() {
        let mut form = FormState::new(&function(vec![ParamSpec::new("amounts", "uint256[]")]));
        form.set_decimal_scale("amounts", 6).unwrap();

        let len = form.set_array_text("amounts", "1, 2.5,\n\n 0.000001 ,").unwrap();
        assert_eq!(len, 3);
        assert_eq!(
            form.raw_args(),
            vec![RawArg::Array(vec![
                "1000000".into(),
                "2500000".into(),
                "1".into()
            ])]
        );
    }

    #[test]
    fn test_raw_mode_round_trip() {
        let mut form = transfer_form();
        form.set_value("amount", "1.5").unwrap();

        assert!(form.toggle_raw_mode("amount").unwrap());
        let entry = scalar(&form, "amount");
        assert_eq!(entry.display, "1500000000000000000");
        assert_eq!(entry.raw, "1500000000000000000");

        // Raw input is encoded verbatim
        form.set_value("amount", "42").unwrap();
        assert_eq!(scalar(&form, "amount").raw, "42");

        assert!(!form.toggle_raw_mode("amount").unwrap());
        let entry = scalar(&form, "amount");
        assert_eq!(entry.display, "0.000000000000000042");
        assert_eq!(entry.raw, "42");

        assert_eq!(
            form.toggle_raw_mode("to"),
            Err(FormError::NotNumeric("to".into()))
        );
    }

    #[test]
    fn test_decimal_scale_clears_values() {
        let mut form = FormState::new(&function(vec![ParamSpec::new("amounts", "uint256[]")]));
        form.set_array_text("amounts", "1,2,3").unwrap();
        form.set_decimal_scale("amounts", 8).unwrap();

        let state = form.param("amounts").unwrap();
        assert_eq!(state.decimal_scale, 8);
        assert_eq!(state.array_len(), 3);
        assert!(state.value.entries().iter().all(|e| e.raw.is_empty()));

        assert_eq!(
            form.set_decimal_scale("amounts", 78),
            Err(FormError::ScaleTooLarge(78))
        );
    }

    #[test]
    fn test_unnamed_params_get_positional_keys() {
        let form = FormState::new(&function(vec![
            ParamSpec::new("", "uint256"),
            ParamSpec::new("", "bool"),
        ]));
        assert!(form.param("arg0").is_ok());
        assert!(form.param("arg1").is_ok());
        assert_eq!(
            form.param("missing"),
            Err(FormError::UnknownParam("missing".into()))
        );
    }

    #[test]
    fn test_shape_errors() {
        let mut form = transfer_form();
        assert_eq!(
            form.add_element("amount"),
            Err(FormError::NotAnArray("amount".into()))
        );
        let mut arrays = FormState::new(&function(vec![ParamSpec::new("ids", "uint256[]")]));
        assert_eq!(
            arrays.set_value("ids", "1"),
            Err(FormError::NotAScalar("ids".into()))
        );
    }
}
