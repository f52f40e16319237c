//! Macros for error/warning printing

/// Expand to an error message
#[macro_export]
macro_rules! tilestack_error {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[tilestack error]".red().bold(), format!($($err)*));
    })
}

/// Expand to an info message
#[macro_export]
macro_rules! tilestack_info {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[tilestack info]".purple().bold(), format!($($err)*));
    })
}

/// Expand to a fatal message
#[macro_export]
macro_rules! tilestack_fatal {
    ($($err:tt)*) => ({
        use colored::Colorize;
        eprintln!("{}: {}", "[tilestack fatal]".yellow().bold(), format!($($err)*));
        std::process::exit(1);
    })
}
