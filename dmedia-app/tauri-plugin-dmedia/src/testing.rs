//! In-memory platform used by the unit tests.

use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::models::ResultIntent;
use crate::platform::{DocumentHandle, DocumentProvider, ResultHost};
use crate::{Error, Result};

pub const PACKAGE: &str = "org.altlimit.dmedia";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    RequestStoragePermission(i32),
    LaunchFolderPicker(i32),
    SetResult(i32, Option<ResultIntent>),
    Finish,
}

#[derive(Debug, Default)]
pub struct FakePlatform {
    files: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<PlatformCall>>,
    storage_permission: bool,
    picker_broken: bool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            storage_permission: true,
            ..Self::default()
        }
    }

    pub fn with_file(self, path: &str) -> Self {
        self.files.borrow_mut().insert(path.to_string());
        self
    }

    pub fn without_storage_permission(mut self) -> Self {
        self.storage_permission = false;
        self
    }

    pub fn with_broken_picker(mut self) -> Self {
        self.picker_broken = true;
        self
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.borrow().contains(path)
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.borrow().clone()
    }

    pub fn finish_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| **c == PlatformCall::Finish)
            .count()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl DocumentProvider for FakePlatform {
    fn has_storage_permission(&self) -> Result<bool> {
        Ok(self.storage_permission)
    }

    fn request_storage_permission(&self, request_code: i32) -> Result<()> {
        self.record(PlatformCall::RequestStoragePermission(request_code));
        Ok(())
    }

    fn launch_folder_picker(&self, request_code: i32) -> Result<()> {
        if self.picker_broken {
            return Err(Error::Picker("no activity handles OPEN_DOCUMENT_TREE".into()));
        }
        self.record(PlatformCall::LaunchFolderPicker(request_code));
        Ok(())
    }

    fn find_document(&self, path: &str, _requires_write: bool) -> Result<Option<DocumentHandle>> {
        Ok(self.has_file(path).then(|| DocumentHandle {
            uri: format!("content://documents/{}", path.trim_start_matches('/')),
        }))
    }

    fn delete_document(&self, document: &DocumentHandle) -> Result<bool> {
        let path = format!(
            "/{}",
            document.uri.trim_start_matches("content://documents/")
        );
        Ok(self.files.borrow_mut().remove(&path))
    }
}

impl ResultHost for FakePlatform {
    fn package_name(&self) -> Result<String> {
        Ok(PACKAGE.to_string())
    }

    fn uri_for_file(&self, authority: &str, path: &str) -> Result<String> {
        if !self.has_file(path) {
            return Err(Error::Resolution(format!(
                "java.lang.IllegalArgumentException: Failed to find configured root that contains {}",
                path
            )));
        }
        Ok(format!("content://{}/root{}", authority, path))
    }

    fn set_result(&self, result_code: i32, intent: Option<ResultIntent>) -> Result<()> {
        self.record(PlatformCall::SetResult(result_code, intent));
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        self.record(PlatformCall::Finish);
        Ok(())
    }
}
