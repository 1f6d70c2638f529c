// hppguard/src/ui/output_format.rs
//! Colored status lines for stderr.
//!
//! Every function takes `supports_color` so that output written to a pipe or
//! a file stays free of ANSI escapes.

use std::io::{self, Write};

use owo_colors::{AnsiColors, OwoColorize};

fn print_tagged<W: Write>(writer: &mut W, tag: &str, color: AnsiColors, msg: &str, supports_color: bool) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", tag.color(color).bold(), msg)
    } else {
        writeln!(writer, "{} {}", tag, msg)
    }
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[warn]", AnsiColors::Yellow, msg, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[error]", AnsiColors::Red, msg, supports_color)
}
