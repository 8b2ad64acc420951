use unikboot_models::models::RunCommand;

use super::{assert_not_none, Builder, BuilderError};

#[derive(Debug, Default)]
pub struct RunCommandBuilder {
    bin: Option<String>,
    argv: Vec<String>,
    runmode: Option<String>,
}

impl RunCommandBuilder {
    pub fn new() -> RunCommandBuilder {
        RunCommandBuilder::default()
    }

    pub fn with_bin(mut self, bin: String) -> RunCommandBuilder {
        self.bin = Some(bin);
        self
    }

    pub fn with_arg(mut self, arg: String) -> RunCommandBuilder {
        self.argv.push(arg);
        self
    }

    /// Let the next command start without waiting for this one
    pub fn in_background(mut self) -> RunCommandBuilder {
        self.runmode = Some("&".to_string());
        self
    }
}

impl Builder<RunCommand> for RunCommandBuilder {
    fn try_build(self) -> Result<RunCommand, BuilderError> {
        assert_not_none(stringify!(self.bin), &self.bin)?;
        let bin = self.bin.unwrap();
        let mut argv = self.argv;
        if argv.is_empty() {
            argv.push(bin.clone());
        }
        Ok(RunCommand {
            bin,
            argv,
            runmode: self.runmode,
        })
    }
}
