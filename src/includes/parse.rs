//! Include directive parsing
//!
//! Recognizes preprocessor include lines:
//! #include "classic/a2dp.h"
//! #  include <stdint.h>   /* trailing text is kept */

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Static regex for include directives at the start of a line
/// Group `q` holds a quoted target, group `a` an angle-bracketed one.
/// Matches raw bytes so sources with stray Latin-1 comments still parse.
pub static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*#\s*include\s*(?:"(?P<q>[^"\r\n]+)"|<(?P<a>[^>\r\n]+)>)"#)
        .expect("Invalid INCLUDE_RE regex")
});

/// How the include target is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Quote,
    Angle,
}

impl Delimiter {
    /// Render a target with these delimiters
    pub fn wrap(&self, target: &str) -> String {
        match self {
            Delimiter::Quote => format!("\"{}\"", target),
            Delimiter::Angle => format!("<{}>", target),
        }
    }
}

/// One include directive found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// 1-indexed line number
    pub line: u32,
    pub delimiter: Delimiter,
    /// The requested name, e.g. `classic/a2dp.h`
    pub target: String,
    /// Byte span of the delimited target (delimiters included) within the line
    pub span: Range<usize>,
}

impl IncludeDirective {
    /// The directive text as written, e.g. `"hci.h"`
    pub fn written(&self) -> String {
        self.delimiter.wrap(&self.target)
    }
}

/// Parse a single line (without its terminator)
pub fn parse_line(line: &[u8], line_num: u32) -> Option<IncludeDirective> {
    let caps = INCLUDE_RE.captures(line)?;

    let (delimiter, m) = match (caps.name("q"), caps.name("a")) {
        (Some(m), _) => (Delimiter::Quote, m),
        (None, Some(m)) => (Delimiter::Angle, m),
        (None, None) => return None,
    };

    let target = std::str::from_utf8(m.as_bytes()).ok()?.trim();
    if target.is_empty() {
        return None;
    }

    Some(IncludeDirective {
        line: line_num,
        delimiter,
        target: target.to_string(),
        span: m.start() - 1..m.end() + 1,
    })
}

/// Parse every include directive in a file's content
pub fn parse_content(content: &[u8]) -> Vec<IncludeDirective> {
    content
        .split(|&b| b == b'\n')
        .enumerate()
        .filter_map(|(idx, line)| parse_line(line, idx as u32 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"#include "hci.h""#, Delimiter::Quote, "hci.h")]
    #[case(r#"#include <stdint.h>"#, Delimiter::Angle, "stdint.h")]
    #[case(r#"  #  include   "classic/a2dp.h"  // A2DP"#, Delimiter::Quote, "classic/a2dp.h")]
    #[case("#include\t\"btstack_config.h\"", Delimiter::Quote, "btstack_config.h")]
    #[case(r#"#include"packed.h""#, Delimiter::Quote, "packed.h")]
    fn test_parse_line(#[case] line: &str, #[case] delimiter: Delimiter, #[case] target: &str) {
        let directive = parse_line(line.as_bytes(), 1).expect("directive");
        assert_eq!(directive.delimiter, delimiter);
        assert_eq!(directive.target, target);
        assert_eq!(&line[directive.span.clone()], directive.written());
    }

    #[rstest]
    #[case("// #include \"hci.h\"")]
    #[case("#define HCI_H")]
    #[case("#include HEADER_MACRO")]
    #[case("#include \"\"")]
    #[case("#include \"unterminated.h")]
    #[case("#include <mismatched.h\"")]
    #[case("#included \"nope.h\"")]
    fn test_parse_line_rejects(#[case] line: &str) {
        assert_eq!(parse_line(line.as_bytes(), 1), None);
    }

    #[test]
    fn test_parse_content_line_numbers() {
        let content = "/* header */\n#include <stdint.h>\n\n#include \"hci.h\"\r\nint x;\n";
        let directives = parse_content(content.as_bytes());

        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].line, 2);
        assert_eq!(directives[0].delimiter, Delimiter::Angle);
        assert_eq!(directives[1].line, 4);
        assert_eq!(directives[1].target, "hci.h");
    }

    #[test]
    fn test_parse_content_with_latin1_comment() {
        let content = b"/* \xa9 1999 */\n#include \"oi_codec_sbc.h\"\n";
        let directives = parse_content(content);

        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].line, 2);
        assert_eq!(directives[0].target, "oi_codec_sbc.h");
    }

    #[test]
    fn test_delimiter_wrap() {
        assert_eq!(Delimiter::Quote.wrap("a.h"), "\"a.h\"");
        assert_eq!(Delimiter::Angle.wrap("a.h"), "<a.h>");
    }
}
