// Field Validators - Reusable validation components
use once_cell::sync::Lazy;
use regex::Regex;

/// Trait for field validators
pub trait FieldValidator {
    /// Validate a field value
    fn validate(&self, value: &str) -> Result<(), String>;
}

/// String validator with various constraints
#[derive(Debug, Clone)]
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
    digits_only: bool,
    not_empty: bool,
    trim: bool,
}

impl Default for StringValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StringValidator {
    /// Create a new string validator
    pub const fn new() -> Self {
        Self { min_length: None, max_length: None, digits_only: false, not_empty: false, trim: true }
    }

    /// Require non-empty string
    #[must_use]
    pub const fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    /// Set minimum length (in characters)
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set maximum length (in characters)
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Only ASCII digits are accepted
    #[must_use]
    pub const fn digits_only(mut self) -> Self {
        self.digits_only = true;
        self
    }

    /// Set whether to trim before validation
    #[must_use]
    pub const fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

impl FieldValidator for StringValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let val = if self.trim { value.trim() } else { value };
        let len = val.chars().count();

        if self.not_empty && val.is_empty() {
            return Err("Value cannot be empty".to_string());
        }

        if let Some(min) = self.min_length {
            if len < min {
                return Err(format!("Length must be at least {min} characters"));
            }
        }

        if let Some(max) = self.max_length {
            if len > max {
                return Err(format!("Length must not exceed {max} characters"));
            }
        }

        if self.digits_only && !val.chars().all(|c| c.is_ascii_digit()) {
            return Err("Only digits are allowed".to_string());
        }

        Ok(())
    }
}

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("EMAIL_REGEX pattern is valid and well-formed")
});

/// Email validator
#[derive(Debug, Clone, Default)]
pub struct EmailValidator;

impl EmailValidator {
    /// Create a new email validator
    pub const fn new() -> Self {
        Self
    }
}

impl FieldValidator for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if !EMAIL_REGEX.is_match(value.trim()) {
            return Err("Invalid email format".to_string());
        }

        Ok(())
    }
}
