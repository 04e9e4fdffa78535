// src/engine.rs
use crate::telemetry::pipeline::ChannelPipeline;
use crate::telemetry::source::{ReadOutcome, Transport};
use crate::types::EngineEvent;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const READ_BUFFER_SIZE: usize = 4096;

// GUI 与读线程共享同一个流水线
pub type SharedPipeline = Arc<Mutex<ChannelPipeline>>;

pub fn shared(pipeline: ChannelPipeline) -> SharedPipeline {
    Arc::new(Mutex::new(pipeline))
}

// 锁中毒时照样取回数据，流水线状态本身总是一致的
pub fn lock_pipeline(pipeline: &SharedPipeline) -> MutexGuard<'_, ChannelPipeline> {
    pipeline.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// 一次连接: 后台读线程 + 取消标志 + 写队列
pub struct Connection {
    cancel: Arc<AtomicBool>,
    writes: Sender<Vec<u8>>,
    handle: Option<JoinHandle<()>>,
    label: String,
    pipeline: SharedPipeline,
}

impl Connection {
    pub fn start(
        mut transport: Box<dyn Transport>,
        pipeline: SharedPipeline,
        events: Sender<EngineEvent>,
    ) -> Self {
        let label = transport.describe();
        let cancel = Arc::new(AtomicBool::new(false));
        let (writes, rx_writes) = channel::<Vec<u8>>();

        {
            let mut p = lock_pipeline(&pipeline);
            p.connect();
            p.monitor_mut().push_info("Serial connection established");
        }
        info!("connected to {label}");
        events.send(EngineEvent::Connected(label.clone())).ok();

        let flag = Arc::clone(&cancel);
        let shared = Arc::clone(&pipeline);
        let handle = thread::spawn(move || {
            let reason = read_loop(transport.as_mut(), &shared, &flag, &rx_writes);
            // 关闭顺序: 取消读 -> 关闭句柄 -> 流水线回到 Idle
            transport.close();
            let buffered = {
                let mut p = lock_pipeline(&shared);
                p.disconnect();
                match &reason {
                    Some(err) => p.monitor_mut().push_error(&format!("Serial read error - {err}")),
                    None => p.monitor_mut().push_info("Serial connection closed"),
                }
                p.len()
            };
            events
                .send(EngineEvent::Log(format!("{buffered} samples kept")))
                .ok();
            if let Some(err) = &reason {
                warn!("read loop stopped: {err}");
            }
            events.send(EngineEvent::Disconnected(reason)).ok();
        });

        Self {
            cancel,
            writes,
            handle: Some(handle),
            label,
            pipeline,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    // 串口监视器的 "发送": 回显 SENT 行，自动补换行
    pub fn send_line(&self, text: &str) -> bool {
        lock_pipeline(&self.pipeline).monitor_mut().push_sent(text);
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(b'\n');
        self.writes.send(bytes).is_ok()
    }

    pub fn disconnect(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("read loop for {} panicked", self.label);
            }
            info!("disconnected from {}", self.label);
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// 返回 None 表示正常结束 (取消或流结束)，Some 为错误原因
fn read_loop(
    transport: &mut dyn Transport,
    pipeline: &SharedPipeline,
    cancel: &AtomicBool,
    writes: &Receiver<Vec<u8>>,
) -> Option<String> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        if cancel.load(Ordering::SeqCst) {
            return None;
        }

        // 1. 先把待发送的数据写出去
        loop {
            match writes.try_recv() {
                Ok(bytes) => {
                    if let Err(err) = transport.write_all(&bytes) {
                        return Some(err.to_string());
                    }
                    debug!("wrote {} bytes", bytes.len());
                }
                Err(_) => break,
            }
        }

        // 2. 读一块数据
        let outcome = match transport.read_chunk(&mut buf) {
            Ok(outcome) => outcome,
            Err(err) => return Some(err.to_string()),
        };

        // 3. 读返回后重新检查: disconnect 可能已经抢先发生
        if cancel.load(Ordering::SeqCst) {
            return None;
        }
        let mut guard = lock_pipeline(pipeline);
        if !guard.is_connected() {
            return None;
        }
        match outcome {
            ReadOutcome::Data(n) => {
                guard.on_chunk(&buf[..n]);
            }
            ReadOutcome::Pending => {}
            ReadOutcome::Closed => {
                guard.flush_pending();
                info!("stream ended");
                return None;
            }
        }
        guard.tick(Instant::now());
    }
}
