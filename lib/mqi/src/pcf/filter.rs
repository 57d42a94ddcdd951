use bytes::Bytes;

use super::Parameter;
use crate::{
    constants::{cmqc::*, cmqcfc::*},
    error::{Interface, Result},
};

/// Comparison operator of a filter condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterOperator {
    Less,
    Equal,
    Greater,
    NotLess,
    NotEqual,
    NotGreater,
    Like,
    NotLike,
    Contains,
    Excludes,
    ContainsGen,
    ExcludesGen,
}

impl FilterOperator {
    /// `MQCFOP_*` value of the operator.
    pub const fn code(self) -> i32 {
        match self {
            Self::Less => MQCFOP_LESS,
            Self::Equal => MQCFOP_EQUAL,
            Self::Greater => MQCFOP_GREATER,
            Self::NotLess => MQCFOP_NOT_LESS,
            Self::NotEqual => MQCFOP_NOT_EQUAL,
            Self::NotGreater => MQCFOP_NOT_GREATER,
            Self::Like => MQCFOP_LIKE,
            Self::NotLike => MQCFOP_NOT_LIKE,
            Self::Contains => MQCFOP_CONTAINS,
            Self::Excludes => MQCFOP_EXCLUDES,
            Self::ContainsGen => MQCFOP_CONTAINS_GEN,
            Self::ExcludesGen => MQCFOP_EXCLUDES_GEN,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        [
            Self::Less,
            Self::Equal,
            Self::Greater,
            Self::NotLess,
            Self::NotEqual,
            Self::NotGreater,
            Self::Like,
            Self::NotLike,
            Self::Contains,
            Self::Excludes,
            Self::ContainsGen,
            Self::ExcludesGen,
        ]
        .into_iter()
        .find(|op| op.code() == code)
    }
}

/// Operand of a filter condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterValue {
    Integer(i32),
    String(Bytes),
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(Bytes::from(value))
    }
}

impl From<Bytes> for FilterValue {
    fn from(value: Bytes) -> Self {
        Self::String(value)
    }
}

/// A filter condition attached to an inquiry command.
///
/// Whether the condition becomes a string or an integer filter is decided by the selector: character attribute
/// selectors (`MQCA_*`) take string operands and integer attribute selectors (`MQIA_*`) take integer operands.
///
/// ```
/// use mqi::{constants::cmqc::MQCA_Q_NAME, pcf::Filter};
///
/// let filter = Filter::new(MQCA_Q_NAME).like("APP.*").expect("character selector");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Filter {
    selector: i32,
    operator: FilterOperator,
    value: FilterValue,
}

/// Selector awaiting an operator.
#[derive(Clone, Copy, Debug)]
pub struct FilterBuilder {
    selector: i32,
}

impl Filter {
    pub fn new(selector: i32) -> FilterBuilder {
        FilterBuilder { selector }
    }

    pub fn selector(&self) -> i32 {
        self.selector
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Converts the condition into its PCF parameter.
    pub fn to_parameter(&self) -> Parameter {
        match &self.value {
            FilterValue::Integer(value) => Parameter::IntegerFilter {
                parameter: self.selector,
                operator: self.operator.code(),
                value: *value,
            },
            FilterValue::String(value) => Parameter::StringFilter {
                parameter: self.selector,
                operator: self.operator.code(),
                ccsid: 0,
                value: value.clone(),
            },
        }
    }
}

impl FilterBuilder {
    /// Builds a condition with an arbitrary operator.
    pub fn operator(self, operator: FilterOperator, value: impl Into<FilterValue>) -> Result<Filter> {
        let value = value.into();
        let is_character = (MQCA_FIRST..=MQCA_LAST).contains(&self.selector);
        let is_integer = (MQIA_FIRST..=MQIA_LAST).contains(&self.selector);

        match (&value, is_character, is_integer) {
            (FilterValue::String(_), true, _) | (FilterValue::Integer(_), _, true) => Ok(Filter {
                selector: self.selector,
                operator,
                value,
            }),
            (_, false, false) => Interface {
                reason: format!("unrecognized filter selector {}", self.selector),
            }
            .fail(),
            (FilterValue::String(_), _, _) => Interface {
                reason: format!("selector {} takes an integer operand", self.selector),
            }
            .fail(),
            (FilterValue::Integer(_), _, _) => Interface {
                reason: format!("selector {} takes a string operand", self.selector),
            }
            .fail(),
        }
    }

    pub fn less(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::Less, value)
    }

    pub fn equal(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::Equal, value)
    }

    pub fn greater(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::Greater, value)
    }

    pub fn not_less(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::NotLess, value)
    }

    pub fn not_equal(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::NotEqual, value)
    }

    pub fn not_greater(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::NotGreater, value)
    }

    pub fn like(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::Like, value)
    }

    pub fn not_like(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::NotLike, value)
    }

    pub fn contains(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::Contains, value)
    }

    pub fn excludes(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::Excludes, value)
    }

    pub fn contains_gen(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::ContainsGen, value)
    }

    pub fn excludes_gen(self, value: impl Into<FilterValue>) -> Result<Filter> {
        self.operator(FilterOperator::ExcludesGen, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_range_decides_filter_type() {
        let string = Filter::new(MQCA_Q_NAME).like("APP.*").expect("should build string filter");
        assert_eq!(
            string.to_parameter(),
            Parameter::StringFilter {
                parameter: MQCA_Q_NAME,
                operator: MQCFOP_LIKE,
                ccsid: 0,
                value: Bytes::from_static(b"APP.*"),
            }
        );

        let integer = Filter::new(MQIA_CURRENT_Q_DEPTH)
            .greater(10)
            .expect("should build integer filter");
        assert_eq!(
            integer.to_parameter(),
            Parameter::IntegerFilter {
                parameter: MQIA_CURRENT_Q_DEPTH,
                operator: MQCFOP_GREATER,
                value: 10,
            }
        );
    }

    #[test]
    fn mismatched_operands_are_rejected() {
        assert!(Filter::new(MQCA_Q_NAME).equal(5).is_err());
        assert!(Filter::new(MQIA_CURRENT_Q_DEPTH).equal("5").is_err());
        assert!(Filter::new(9000).equal(5).is_err());
    }

    #[test]
    fn operator_codes() {
        assert_eq!(FilterOperator::ExcludesGen.code(), 29);
        assert_eq!(FilterOperator::from_code(18), Some(FilterOperator::Like));
        assert_eq!(FilterOperator::from_code(0), None);
    }
}
