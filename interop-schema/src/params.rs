//! Splitting of opaque parameter strings into argv tokens.

/// Flags that make a publisher print every sample it writes. Shape
/// applications differ on the spelling.
pub const SAMPLE_REPORTING_FLAGS: &[&str] = &["-w", "-v"];

/// Split a parameter string on whitespace, honouring quotes.
///
/// `-t Square -p "p1"` yields `["-t", "Square", "-p", "p1"]`. Quotes are
/// removed; an unterminated quote runs to the end of the string.
pub fn split_parameters(parameters: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in parameters.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_ascii_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}

/// True when the parameters request per-sample output from a publisher.
pub fn requests_sample_reporting(parameters: &str) -> bool {
    split_parameters(parameters)
        .iter()
        .any(|t| SAMPLE_REPORTING_FLAGS.contains(&t.as_str()))
}
