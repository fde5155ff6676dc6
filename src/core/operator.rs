/// Compare operators shared by the value-compare and random-value resolvers.
use crate::schema::template::TemplateKind;

/// An operator as authored in a compare condition.
///
/// The six primitive operators map to builtin fragment templates. The
/// string operators have no fragment; templates branch on them with
/// conditional blocks instead (function call vs. infix operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl CompareOperator {
    pub const PRIMITIVE: [CompareOperator; 6] = [
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
    ];

    pub const NON_PRIMITIVE: [CompareOperator; 3] =
        [Self::Contains, Self::StartsWith, Self::EndsWith];

    /// Parses an authored operator. Word operators are case-insensitive.
    pub fn parse(input: &str) -> Option<CompareOperator> {
        match input.trim().to_lowercase().as_str() {
            "=" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            "contains" => Some(Self::Contains),
            "startswith" => Some(Self::StartsWith),
            "endswith" => Some(Self::EndsWith),
            _ => None,
        }
    }

    pub fn is_primitive(self) -> bool {
        self.template_kind().is_some()
    }

    /// The builtin fragment template for primitive operators.
    pub fn template_kind(self) -> Option<TemplateKind> {
        match self {
            Self::Equal => Some(TemplateKind::CompareEqual),
            Self::NotEqual => Some(TemplateKind::CompareNotEqual),
            Self::Less => Some(TemplateKind::CompareLess),
            Self::LessOrEqual => Some(TemplateKind::CompareLessOrEqual),
            Self::Greater => Some(TemplateKind::CompareGreater),
            Self::GreaterOrEqual => Some(TemplateKind::CompareGreaterOrEqual),
            Self::Contains | Self::StartsWith | Self::EndsWith => None,
        }
    }

    /// Name of the conditional block selecting this string operator.
    pub fn block_name(self) -> Option<&'static str> {
        match self {
            Self::Contains => Some("Condition_Operator_Contains"),
            Self::StartsWith => Some("Condition_Operator_StartsWith"),
            Self::EndsWith => Some("Condition_Operator_EndsWith"),
            _ => None,
        }
    }
}
