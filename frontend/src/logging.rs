//! Tracing/logging initialization.
//!
//! 浏览器中输出到 `console`，其它环境输出到 stderr。
//! WASM 下没有可用的系统时钟，因此不输出时间戳。

use crate::config::AppConfig;
use tracing::Level;

/// Initialize tracing for the app.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &AppConfig) {
    let level = if config.debug_features() {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(console::MakeConsoleWriter)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;

    /// 按行缓冲，drop 时一次性写入 `console.log`
    #[derive(Default)]
    pub struct ConsoleWriter {
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let line = String::from_utf8_lossy(&self.buf);
            let line = line.trim_end();
            if !line.is_empty() {
                web_sys::console::log_1(&line.into());
            }
        }
    }

    pub struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod console {
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;

    pub struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = io::Stderr;

        fn make_writer(&'a self) -> Self::Writer {
            io::stderr()
        }
    }
}
