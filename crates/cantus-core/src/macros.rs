//! Convenience macros for building event arguments.

/// Build [`EventArgs`](crate::EventArgs) from a list of values.
///
/// # Example
/// ```ignore
/// seq.launch_with("phrase", event_args![3i64, "forte"])?;
/// ```
#[macro_export]
macro_rules! event_args {
    () => {
        $crate::EventArgs::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut args = $crate::EventArgs::new();
        $(args.push($value);)+
        args
    }};
}
