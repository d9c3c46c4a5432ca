//! Integer console I/O for generated code

use std::io::{self, BufRead, Write};

/// Print `value` and a newline to stdout
#[no_mangle]
pub extern "C" fn print_int(value: i64) {
    let mut out = io::stdout().lock();
    if let Err(e) = writeln!(out, "{}", value).and_then(|()| out.flush()) {
        log::warn!("print_int: {}", e);
    }
}

/// Read one integer line from stdin; 0 on end of input or a parse error
#[no_mangle]
pub extern "C" fn read_int() -> i64 {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => {
            log::warn!("read_int: end of input");
            0
        },
        Ok(_) => parse_int(&line),
        Err(e) => {
            log::warn!("read_int: {}", e);
            0
        },
    }
}

fn parse_int(line: &str) -> i64 {
    let text = line.trim();
    text.parse().unwrap_or_else(|e| {
        log::warn!("read_int: {:?} is not an integer: {}", text, e);
        0
    })
}
