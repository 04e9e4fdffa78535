// src/types.rs

// 打开哪一种数据源
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportSpec {
    Serial { port: String, baud: u32 },
    Simulated { channels: usize, interval_ms: u64 },
}

// 后台读线程发给 GUI 的消息
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Log(String),
    Connected(String),
    // None = 正常断开; Some = 传输层错误
    Disconnected(Option<String>),
}

// 外部权限判断，只决定是否显示管理按钮
pub trait AccessPolicy {
    fn is_privileged(&self) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StaticAccess {
    pub privileged: bool,
}

impl StaticAccess {
    pub const ENV_VAR: &'static str = "LIVE_GRAPHER_ADMIN";

    pub fn from_env() -> Self {
        let privileged = std::env::var(Self::ENV_VAR)
            .map(|v| v.trim() == "1")
            .unwrap_or(false);
        Self { privileged }
    }
}

impl AccessPolicy for StaticAccess {
    fn is_privileged(&self) -> bool {
        self.privileged
    }
}
