#![forbid(unsafe_code)]

use apple_cloudkit::{cli, NAME};

fn main() {
    cli::exec(NAME)
}
