//! # Location
//!
//! Data to locate spans of text, in files.
//! The main struct is [`Location`].

use std::{path::Path, rc::Rc};

/// # Summary
///
/// Information about a position in a file,
/// stored as `(line, char_position)`.
///
/// # Example
///
/// ```text
/// abc def
/// ghi
/// ```
///
/// Here, the `CharLocation` of `a` is `(0, 0)`,
/// and the one of `i` is `(1, 2)`.
pub type CharLocation = (usize, usize);


/// # Summary
///
/// Stores the location of any bit of information that is bound to a file.
/// Asks a start position (inclusive) and an end position (exclusive).
/// This means that if my chunk of data is one character long,
/// and starts at the beginning of the file `myfile`, its location is
/// `Location::new(Path::new("myfile"), (0, 0), (0, 1))`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Location {
    file: Rc<Path>,
    start: CharLocation,
    end: CharLocation,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "in file {}, ", self.file.display())?;
        if self.start == self.end {
            write!(
                f,
                "at character {} of line {}",
                self.start.1,
                self.start.0 + 1,
            )
        } else if self.start.0 == self.end.0 {
            write!(
                f,
                "at characters {}-{} of line {}",
                self.start.1,
                self.end.1,
                self.start.0 + 1,
            )
        } else {
            write!(
                f,
                "from character {} of line {} to character {} of line {}",
                self.start.1,
                self.start.0 + 1,
                self.end.1,
                self.end.0 + 1,
            )
        }
    }
}

impl Location {
    /// Create a new `Location` object.
    /// Requires three arguments,
    ///  * file: the name of the file where the data is;
    ///  * start: the location (inclusive) of the beginning of the data;
    ///  * end: the location (exclusive) of the end of the data.
    ///
    /// Panics if start > end (lexicographic order).
    pub fn new(
        file: impl Into<Rc<Path>>,
        start: CharLocation,
        end: CharLocation,
    ) -> Self {
        assert!(start.0 < end.0 || (start.0 == end.0 && start.1 <= end.1));
        let file = file.into();
        Self { file, start, end }
    }

    /// Return the `file` of the location.
    pub fn file(&self) -> Rc<Path> {
        self.file.clone()
    }

    /// Return the `start` of the location, inclusive.
    pub fn start(&self) -> CharLocation {
        self.start
    }

    /// Return the `end` of the location, exclusive.
    pub fn end(&self) -> CharLocation {
        self.end
    }
}
