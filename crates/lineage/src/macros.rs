//! Convenience macros

/// Build a heterogeneous argument list of [`Value`](crate::Value)s
///
/// Each expression is converted with `Value::from`, so nested `args![..]`
/// lists, JSON literals, strings, numbers and error instances mix freely.
///
/// # Examples
///
/// ```rust
/// use lineage::{Value, args};
///
/// let list = args!["SOS!", 503, args!["a", "b"]];
/// assert_eq!(list.len(), 3);
/// assert_eq!(list[0], Value::from("SOS!"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
