// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Xiaobaix CLI entrypoint.
//!
//! A small inspector over the extraction and rendering pipeline: feed it
//! message text and it prints the extracted variables, or the rendered
//! template when one is given. Useful for debugging tag grammars and
//! templates outside a host.

use std::error::Error;
use std::io::Read;

use xiaobaix::extract::{extract_vars, RegexCache};
use xiaobaix::render::render_template;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<file>] [--custom-regex <pattern>] [--template <file>]\n\nReads message text from <file> (or stdin when omitted) and prints the\nextracted variables as JSON.\n\n--custom-regex uses <pattern> as the tag grammar instead of the built-in\n[name]body[/name] scan. Patterns need two capture groups (name, body);\nanything else falls back to the built-in scan.\n\n--template renders the given template file with the extracted variables\nand prints the result instead of the variables."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    input: Option<String>,
    custom_regex: Option<String>,
    template: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--custom-regex" => {
                if options.custom_regex.is_some() {
                    return Err(());
                }
                let pattern = args.next().ok_or(())?;
                options.custom_regex = Some(pattern);
            }
            "--template" => {
                if options.template.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.template = Some(path);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.input.is_some() {
                    return Err(());
                }
                options.input = Some(arg);
            }
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "xiaobaix".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let text = match &options.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        let mut cache = RegexCache::new();
        let vars = extract_vars(&text, options.custom_regex.as_deref(), &mut cache);

        match &options.template {
            Some(path) => {
                let template = std::fs::read_to_string(path)?;
                println!("{}", render_template(&template, &vars));
            }
            None => {
                println!("{}", serde_json::to_string_pretty(&vars)?);
            }
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("xiaobaix: {err}");
        std::process::exit(1);
    }
}
