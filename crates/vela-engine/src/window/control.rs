use std::process::ExitCode;

/// Outcome of a runtime run, convertible into a process exit code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    /// Window or framebuffer config could not be created.
    WindowFailed = 1,
    /// GL context creation or function loading failed.
    LoaderFailed = 2,
    /// The event loop could not be created or terminated abnormally.
    InitFailed = 3,
    /// The application returned an error.
    AppFailed = 4,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Runtime context passed to the application each frame.
///
/// Commands are buffered and applied after `on_frame` returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
    cursor_captured: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Command {
    CaptureCursor(bool),
    Exit,
}

impl RuntimeCtx {
    pub(crate) fn new(cursor_captured: bool) -> Self {
        Self {
            commands: Vec::new(),
            cursor_captured,
        }
    }

    /// Hides and locks the cursor to the window, or releases it.
    pub fn capture_cursor(&mut self, captured: bool) {
        self.cursor_captured = captured;
        self.commands.push(Command::CaptureCursor(captured));
    }

    /// Capture state including requests made this frame.
    pub fn cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        let codes: Vec<u8> = [
            ExitStatus::Success,
            ExitStatus::WindowFailed,
            ExitStatus::LoaderFailed,
            ExitStatus::InitFailed,
            ExitStatus::AppFailed,
        ]
        .iter()
        .map(|s| s.code())
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn capture_request_is_visible_immediately() {
        let mut ctx = RuntimeCtx::new(false);
        ctx.capture_cursor(!ctx.cursor_captured());
        ctx.exit();

        assert!(ctx.cursor_captured());
        assert_eq!(ctx.take_commands(), vec![Command::CaptureCursor(true), Command::Exit]);
        assert!(ctx.take_commands().is_empty());
    }
}
