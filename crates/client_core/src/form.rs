use shared::{domain::FormField, error::InputError, protocol::PredictionRequest};

/// Raw field text as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    size: String,
    bedrooms: String,
    age: String,
}

impl FormState {
    pub fn new(
        size: impl Into<String>,
        bedrooms: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        Self {
            size: size.into(),
            bedrooms: bedrooms.into(),
            age: age.into(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Size => &mut self.size,
            FormField::Bedrooms => &mut self.bedrooms,
            FormField::Age => &mut self.age,
        };
        *slot = value.into();
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Size => &self.size,
            FormField::Bedrooms => &self.bedrooms,
            FormField::Age => &self.age,
        }
    }

    pub fn is_complete(&self) -> bool {
        FormField::ALL
            .iter()
            .all(|field| !self.get(*field).trim().is_empty())
    }

    /// Parses the fields into a request payload. Non-finite or negative
    /// values are rejected so they never reach the wire.
    pub fn to_request(&self) -> Result<PredictionRequest, InputError> {
        Ok(PredictionRequest {
            size: parse_size(&self.size)?,
            bedrooms: parse_count(FormField::Bedrooms, &self.bedrooms)?,
            age: parse_count(FormField::Age, &self.age)?,
        })
    }
}

fn require(field: FormField, raw: &str) -> Result<&str, InputError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(InputError::Missing(field));
    }
    Ok(value)
}

fn parse_size(raw: &str) -> Result<f64, InputError> {
    let value = require(FormField::Size, raw)?;
    let size = value
        .parse::<f64>()
        .ok()
        .filter(|size| size.is_finite())
        .ok_or_else(|| InputError::NotANumber {
            field: FormField::Size,
            value: value.to_string(),
        })?;
    if size < 0.0 {
        return Err(InputError::Negative {
            field: FormField::Size,
            value: value.to_string(),
        });
    }
    Ok(size)
}

fn parse_count(field: FormField, raw: &str) -> Result<i64, InputError> {
    let value = require(field, raw)?;
    let count = value.parse::<i64>().map_err(|_| InputError::NotANumber {
        field,
        value: value.to_string(),
    })?;
    if count < 0 {
        return Err(InputError::Negative {
            field,
            value: value.to_string(),
        });
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_fields_into_request() {
        let request = FormState::new("1500.5", "3", " 10 ")
            .to_request()
            .expect("valid form");
        assert_eq!(
            request,
            PredictionRequest {
                size: 1500.5,
                bedrooms: 3,
                age: 10,
            }
        );
    }

    #[test]
    fn reports_first_missing_field() {
        let err = FormState::new("1500", "", "").to_request().expect_err("missing");
        assert_eq!(err, InputError::Missing(FormField::Bedrooms));
        assert!(!FormState::new("1500", "", "").is_complete());
    }

    #[test]
    fn rejects_nan_and_infinite_sizes() {
        for raw in ["NaN", "inf", "-infinity", "abc"] {
            let err = FormState::new(raw, "3", "10")
                .to_request()
                .expect_err("must reject");
            assert!(
                matches!(err, InputError::NotANumber { field: FormField::Size, .. }),
                "unexpected error for {raw}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_fractional_and_negative_counts() {
        assert!(matches!(
            FormState::new("1500", "2.5", "10").to_request(),
            Err(InputError::NotANumber {
                field: FormField::Bedrooms,
                ..
            })
        ));
        assert!(matches!(
            FormState::new("1500", "2", "-1").to_request(),
            Err(InputError::Negative {
                field: FormField::Age,
                ..
            })
        ));
    }

    #[test]
    fn set_replaces_single_field() {
        let mut form = FormState::default();
        form.set(FormField::Size, "900");
        form.set(FormField::Age, "4");
        assert_eq!(form.get(FormField::Size), "900");
        assert_eq!(form.get(FormField::Bedrooms), "");
        assert_eq!(form.get(FormField::Age), "4");
    }
}
