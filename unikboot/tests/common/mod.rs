use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};

use async_trait::async_trait;
use unikboot::executor::{ContainerRuntime, ExecuteError, LogsOptions};
use unikboot_models::models::ContainerSpec;

/// Stands in for the engine running boot-creator: on start it reads
/// `program.bin` from the bind-mounted directory and writes `vol.img` back.
#[derive(Debug, Default)]
pub struct FakeBootCreator {
    pub exit_code: i64,
    /// Exit fine but forget to write the image
    pub skip_image: bool,
    pub calls: Mutex<Vec<String>>,
    pub specs: Mutex<Vec<ContainerSpec>>,
    /// Host side of the bind mount seen by the last container
    pub staged: Mutex<Option<PathBuf>>,
}

impl FakeBootCreator {
    pub fn exiting_with(exit_code: i64) -> FakeBootCreator {
        FakeBootCreator {
            exit_code,
            ..FakeBootCreator::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn staged(&self) -> Option<PathBuf> {
        self.staged.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ContainerRuntime for FakeBootCreator {
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ExecuteError> {
        self.record("create");
        let (host, _) = spec.host_config.binds[0]
            .rsplit_once(':')
            .expect("bind without container path");
        *self.staged.lock().unwrap() = Some(PathBuf::from(host));
        self.specs.lock().unwrap().push(spec.clone());
        Ok("fake".to_string())
    }

    async fn start_container(&self, _id: &str) -> Result<(), ExecuteError> {
        self.record("start");
        if self.exit_code == 0 && !self.skip_image {
            let dir = self.staged().unwrap();
            let program = fs::read(dir.join("program.bin")).expect("kernel was not staged");
            let mut image = b"IMG:".to_vec();
            image.extend(program);
            fs::write(dir.join("vol.img"), image).unwrap();
        }
        Ok(())
    }

    async fn wait_container(&self, _id: &str) -> Result<i64, ExecuteError> {
        self.record("wait");
        Ok(self.exit_code)
    }

    async fn container_logs(
        &self,
        _id: &str,
        _options: &LogsOptions,
    ) -> Result<String, ExecuteError> {
        self.record("logs");
        Ok("boot-creator: cannot attach loop device\n".to_string())
    }

    async fn remove_container(&self, _id: &str) -> Result<(), ExecuteError> {
        self.record("remove");
        Ok(())
    }
}
