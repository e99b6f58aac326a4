//! SQL dialect configuration
//!
//! A [`Dialect`] supplies the rendering conventions that vary between
//! database engines: the bind placeholder style and the keyword casing.
//! These are pure lookups; no keyword tables are loaded at runtime.

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    Sqlite,
    Mysql,
}

impl Dialect {
    /// Placeholder style used for bind variables
    pub fn param_style(&self) -> ParamStyle {
        match self {
            Self::Postgres => ParamStyle::Numbered,
            Self::Sqlite | Self::Mysql => ParamStyle::Positional,
        }
    }

    /// Casing applied to SQL keywords emitted through the render context
    pub fn keyword_case(&self) -> KeywordCase {
        match self {
            Self::Postgres | Self::Sqlite => KeywordCase::Lower,
            Self::Mysql => KeywordCase::Upper,
        }
    }
}

/// How bind placeholders appear in the rendered SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `$1`, `$2`, ... numbered in render order
    Numbered,
    /// `?` for every bind variable
    Positional,
}

/// Keyword casing preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCase {
    Lower,
    Upper,
}
