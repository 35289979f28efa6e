use std::fmt::{Display, Formatter};

/// Location of a char in a source file, attached to every token and AST node
/// so that error messages can point back into the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub source_file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(source_file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            source_file: source_file.into(),
            line,
            column,
        }
    }
    /// The location `main` is resolved at when the module scope is queried
    /// directly, without a referencing identifier in any file.
    pub fn unknown() -> Self {
        Self {
            source_file: String::new(),
            line: 1,
            column: 1,
        }
    }
    pub fn render(&self, message: &str) -> String {
        format!(
            "{} from {} at {}:{}",
            message, self.source_file, self.line, self.column
        )
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[test]
fn test_render() {
    let loc = Location::new("demo.fun", 3, 7);
    assert_eq!(loc.render("Invalid character ?"), "Invalid character ? from demo.fun at 3:7");
    assert_eq!(format!("{loc}"), "3:7");
}
