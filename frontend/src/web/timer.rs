//! 时钟、延时与去抖/节流工具
//!
//! 决策逻辑只依赖 `Clock` 与票据（`Ticket`），因此可以脱离浏览器测试；
//! 真正的定时器在组件中用 `gloo-timers` 注册，触发时再凭票据确认自己仍是最新的。

use assetdesk_shared::chrono::{DateTime, Utc};
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 当前时间来源
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 异步等待（用于重试退避）
#[async_trait::async_trait(?Send)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// 浏览器 `setTimeout`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSleeper;

#[cfg(target_arch = "wasm32")]
#[async_trait::async_trait(?Send)]
impl Sleeper for BrowserSleeper {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

/// 不等待，直接返回（非浏览器环境）
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait::async_trait(?Send)]
impl Sleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

// =========================================================
// 最新请求票据
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// 代数计数器：每次发起操作取一张票，只有最新的票有效。
///
/// 被新请求取代的旧响应据此丢弃，不会覆盖新数据。
#[derive(Debug, Clone, Default)]
pub struct LatestOnly {
    generation: Arc<AtomicU64>,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// 作废所有已发出的票（如组件卸载）
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// 去抖：时间窗内只有最后一次调度会真正触发
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: LatestOnly,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: LatestOnly::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 登记一次调度，之前未触发的调度全部作废
    pub fn schedule(&self) -> Ticket {
        self.latest.begin()
    }

    /// 定时器到期时调用：仅最后一次调度返回 `true`
    pub fn should_fire(&self, ticket: Ticket) -> bool {
        self.latest.is_current(ticket)
    }

    pub fn cancel(&self) {
        self.latest.invalidate();
    }
}

// =========================================================
// 节流
// =========================================================

/// 节流：两次执行之间至少间隔 `window`
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last: Cell<Option<DateTime<Utc>>>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: Cell::new(None),
        }
    }

    /// 允许执行时记录时间并返回 `Ok`；否则返回剩余等待时间
    pub fn try_acquire(&self, now: DateTime<Utc>) -> Result<(), Duration> {
        if let Some(last) = self.last.get() {
            let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.window {
                return Err(self.window - elapsed);
            }
        }
        self.last.set(Some(now));
        Ok(())
    }
}
