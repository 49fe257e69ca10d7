//! Implements TemplatePort. Reads `<prompts_dir>/<template file>` on every load so
//! prompt edits apply without a restart.

use crate::domain::{DomainError, TemplateId};
use crate::ports::TemplatePort;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct FsTemplateStore {
    base_dir: PathBuf,
}

impl FsTemplateStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn template_path(&self, id: TemplateId) -> PathBuf {
        self.base_dir.join(id.file_name())
    }
}

#[async_trait::async_trait]
impl TemplatePort for FsTemplateStore {
    async fn load(&self, id: TemplateId) -> Result<String, DomainError> {
        let path = self.template_path(id);
        let body = fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::TemplateUnavailable {
                template: id.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;
        debug!(template = %id, len = body.len(), "template loaded");
        Ok(body)
    }
}
