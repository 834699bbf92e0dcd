use clap::Args;
use std::io::{self, Write};

use stream_bf::Settings;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ConfigArgs {
    /// Print a commented sample bf.toml instead of the resolved settings
    #[arg(long = "sample", conflicts_with = "path")]
    pub sample: bool,

    /// Print the location of the user config file
    #[arg(long = "path", conflicts_with = "sample")]
    pub path: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: ConfigArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.sample {
        print!("{}", Settings::sample_config());
    } else if args.path {
        match Settings::user_config_path() {
            Some(path) => println!("{}", path.display()),
            None => {
                eprintln!("{program}: could not determine the config directory");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        let settings = Settings::load();
        if let Err(e) = settings.interpreter.validate() {
            eprintln!("{program}: warning: resolved settings are invalid: {e}");
        }
        print!("{}", settings.to_toml());
    }

    let _ = io::stdout().flush();
    0
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} config            # Print the resolved settings (file + environment)
  {0} config --sample   # Print a sample bf.toml
  {0} config --path     # Print where bf.toml is looked up

Options:
  --sample      Print a commented sample configuration file
  --path        Print the location of the user config file
  --help, -h    Show this help
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
