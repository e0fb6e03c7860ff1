/*!

  Utils for testing boards.

*/

/// Compare board listings as strings up to indentation and blank lines.
#[macro_export]
macro_rules! assert_listing_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let left_lines: Vec<&str> =
                    left_val.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                let right_lines: Vec<&str> =
                    right_val.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                for (left_line, right_line) in left_lines.iter().zip(right_lines.iter()) {
                    assert_eq!(left_line, right_line);
                }
                assert_eq!(left_lines.len(), right_lines.len(), "listings differ in length");
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let left_lines: Vec<&str> =
                    left_val.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                let right_lines: Vec<&str> =
                    right_val.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                for (left_line, right_line) in left_lines.iter().zip(right_lines.iter()) {
                    assert_eq!(left_line, right_line, "{}", std::format_args!($($arg)+));
                }
                assert_eq!(left_lines.len(), right_lines.len(), "{}", std::format_args!($($arg)+));
            }
        }
    };
}
