#![allow(clippy::exit, clippy::unwrap_used)]

use std::{
    env,
    process,
};

fn main() {
    // The game core and its tests build for the host with nothing extra.
    if env::var_os("CARGO_FEATURE_BOARD").is_none() {
        return;
    }

    if env::var("PROFILE").unwrap_or_default() == "release" {
        println!("cargo:rustc-env=DEFMT_LOG=off");
    }

    install_link_hints();
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

/// Re-runs this script as the linker's error handler so undefined symbols
/// come with a hint about the usual cause.
fn install_link_hints() {
    let args: Vec<String> = env::args().collect();
    if let [_, kind, symbol, ..] = args.as_slice() {
        if kind != "undefined-symbol" {
            process::exit(1);
        }
        let hint = match symbol.as_str() {
            "_defmt_timestamp" => Some("defmt has no timestamp: link `esp-println` and add `defmt.x`"),
            "_stack_start" => Some("linker script `linkall.x` is missing"),
            "esp_rtos_initialized" | "esp_rtos_yield_task" | "esp_rtos_task_create" => {
                Some("call `esp_rtos::start` before spawning tasks")
            }
            _ => None,
        };
        if let Some(hint) = hint {
            eprintln!();
            eprintln!("hint: {hint}");
            eprintln!();
        }
        process::exit(0);
    }

    println!(
        "cargo:rustc-link-arg=-Wl,--error-handling-script={}",
        env::current_exe().unwrap().display()
    );
}
