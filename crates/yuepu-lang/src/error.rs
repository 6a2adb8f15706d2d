use super::grammar::{self, NonTerminal, Terminal};
use super::lexer::{CommandId, ParameterKind};
use super::tree::Keyword;
use super::Span;

/// Recoverable problem found while lexing or scanning.
///
/// The token was still produced, using a fallback value where needed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Warning {
    /// A `〚` not followed by two characters and a closing `〛` or `]`.
    #[error("unterminated command")]
    UnterminatedCommand { span: Span },

    /// A command that takes a parameter is not followed by one.
    #[error("the {command} command must be followed by a {kind}")]
    MissingParameter {
        command: CommandId,
        kind: ParameterKind,
        span: Span,
    },

    /// A length without a unit; Q is used.
    #[error("length has no unit")]
    UnknownLengthUnit { span: Span },

    /// A length written in 号.
    #[error("the 号 unit is deprecated")]
    DeprecatedLegacySize { span: Span },

    #[error("{err}")]
    InvalidLegacySize {
        err: yuepu_core::InvalidLegacySize,
        span: Span,
    },

    /// A string with no closing `”` on its line.
    #[error("unterminated string")]
    UnterminatedString { span: Span },
}

impl Warning {
    pub fn span(&self) -> Span {
        use Warning::*;
        match self {
            UnterminatedCommand { span }
            | MissingParameter { span, .. }
            | UnknownLengthUnit { span }
            | DeprecatedLegacySize { span }
            | InvalidLegacySize { span, .. }
            | UnterminatedString { span } => span.clone(),
        }
    }

    pub fn labels(&self) -> Vec<ErrorLabel> {
        use Warning::*;
        let text = match self {
            UnterminatedCommand { .. } => "expected `〛` or `]` after the two command characters".into(),
            MissingParameter { .. } => "expected a literal here; 0 is used".into(),
            UnknownLengthUnit { .. } => "this length is interpreted in Q units".into(),
            DeprecatedLegacySize { .. } => "this length is in 号".into(),
            InvalidLegacySize { err, .. } => format!["the nearest legacy size, {}, is used", err.nearest],
            UnterminatedString { .. } => "the string ends here".into(),
        };
        vec![ErrorLabel {
            span: self.span(),
            text,
        }]
    }

    pub fn notes(&self) -> Vec<String> {
        use Warning::*;
        match self {
            UnknownLengthUnit { .. } => {
                vec!["Lengths should end with one of the units 号, Q, pt or mm".into()]
            }
            DeprecatedLegacySize { .. } | InvalidLegacySize { .. } => {
                vec!["The 号 unit only covers the sizes 0号 (42pt) to 8号 (5pt); prefer pt or Q".into()]
            }
            UnterminatedCommand { .. }
            | MissingParameter { .. }
            | UnterminatedString { .. } => vec![],
        }
    }

    #[cfg(feature = "ariadne")]
    pub fn ariadne_report<'a>(
        &self,
        file_name: &'a str,
    ) -> ariadne::Report<'static, (&'a str, std::ops::Range<usize>)> {
        build_report(
            ariadne::ReportKind::Warning,
            file_name,
            self.span(),
            self.to_string(),
            self.labels(),
            self.notes(),
        )
    }
}

/// Fatal error encountered while parsing the layout script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// The top of the parse stack is a terminal that does not match the input.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: Terminal,
        found: Terminal,
        span: Span,
    },

    /// No production applies to the top of the parse stack and the input.
    #[error("expected {symbol}, found {found}")]
    NoPrediction {
        symbol: NonTerminal,
        found: Terminal,
        span: Span,
    },

    /// A `{` with no matching `}`.
    #[error("unmatched brace")]
    UnmatchedBrace { span: Span },

    /// A notation keyword that is not followed by its `{ }` body.
    #[error("the {keyword} keyword must be followed by a body in braces")]
    MissingBody { keyword: Keyword, span: Span },

    /// Input after the end of the document.
    #[error("unexpected {found} after the end of the document")]
    TrailingInput { found: Terminal, span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        use SyntaxError::*;
        match self {
            UnexpectedToken { span, .. }
            | NoPrediction { span, .. }
            | UnmatchedBrace { span }
            | MissingBody { span, .. }
            | TrailingInput { span, .. } => span.clone(),
        }
    }

    pub fn labels(&self) -> Vec<ErrorLabel> {
        use SyntaxError::*;
        let text = match self {
            UnexpectedToken { found, .. }
            | NoPrediction { found, .. }
            | TrailingInput { found, .. } => format!["found {found} here"],
            UnmatchedBrace { .. } => "this brace is never closed".into(),
            MissingBody { .. } => "this keyword".into(),
        };
        vec![ErrorLabel {
            span: self.span(),
            text,
        }]
    }

    pub fn notes(&self) -> Vec<String> {
        use SyntaxError::*;
        match self {
            NoPrediction { symbol, .. } => {
                let expected: Vec<String> = grammar::expected(*symbol)
                    .into_iter()
                    .map(|t| t.to_string())
                    .collect();
                vec![format!["At this point the parser expects one of: {}", expected.join(", ")]]
            }
            MissingBody { keyword, .. } => match keyword {
                Keyword::Lyric => vec![format!["Write `{keyword} {{ lyrics }}`"]],
                _ => vec![format!["Write `{keyword} {{ header }} {{ notes }}`; the header may be empty"]],
            },
            UnexpectedToken { .. } | UnmatchedBrace { .. } | TrailingInput { .. } => vec![],
        }
    }

    #[cfg(feature = "ariadne")]
    pub fn ariadne_report<'a>(
        &self,
        file_name: &'a str,
    ) -> ariadne::Report<'static, (&'a str, std::ops::Range<usize>)> {
        build_report(
            ariadne::ReportKind::Error,
            file_name,
            self.span(),
            self.to_string(),
            self.labels(),
            self.notes(),
        )
    }
}

/// Label on an error message.
///
/// A label identifies a particular piece of source code and some
/// information about it.
pub struct ErrorLabel {
    pub span: Span,
    pub text: String,
}

#[cfg(feature = "ariadne")]
fn build_report<'a>(
    kind: ariadne::ReportKind<'static>,
    file_name: &'a str,
    span: Span,
    message: String,
    labels: Vec<ErrorLabel>,
    notes: Vec<String>,
) -> ariadne::Report<'static, (&'a str, std::ops::Range<usize>)> {
    let mut color = match kind {
        ariadne::ReportKind::Warning => ariadne::Color::BrightYellow,
        _ => ariadne::Color::BrightRed,
    };
    let mut report = ariadne::Report::build(kind, (file_name, span)).with_message(message);
    for label in labels {
        report = report.with_label(
            ariadne::Label::new((file_name, label.span))
                .with_message(label.text)
                .with_color(color),
        );
        color = ariadne::Color::BrightYellow;
    }
    for note in notes {
        report = report.with_note(note);
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = SyntaxError::UnexpectedToken {
            expected: Terminal::BraceRight,
            found: Terminal::EndOfFile,
            span: 3..3,
        };
        assert_eq!(err.to_string(), "expected `}`, found the end of the input");
        let warning = Warning::MissingParameter {
            command: CommandId::TITLE,
            kind: ParameterKind::Numeric,
            span: 0..0,
        };
        assert_eq!(
            warning.to_string(),
            "the 〚标题〛 command must be followed by a number"
        );
    }

    #[test]
    fn no_prediction_lists_expected_terminals() {
        let err = SyntaxError::NoPrediction {
            symbol: NonTerminal::Item,
            found: Terminal::Number,
            span: 0..1,
        };
        assert_eq!(
            err.notes(),
            vec!["At this point the parser expects one of: an identifier".to_string()]
        );
    }
}
