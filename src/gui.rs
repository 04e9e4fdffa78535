// src/gui.rs
use anyhow::{bail, Context as _};
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotBounds, PlotPoints, Points};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

use live_grapher::config::{PanelSettings, PipelineConfig};
use live_grapher::engine::{lock_pipeline, Connection, SharedPipeline};
use live_grapher::recorder::{live_snapshot_filename, normalize_output_filename};
use live_grapher::serial::available_ports;
use live_grapher::telemetry::channels::MAX_SPLIT_CHANNEL;
use live_grapher::telemetry::monitor::DEFAULT_LOG_FILENAME;
use live_grapher::telemetry::{
    format_axis_label, open_transport, render_frame_png, ChannelSet, CsvTable, FrameSnapshot,
    GrapherError, GraphStyle, LinkState, PlotStyle, ScaleMode, ValueRange,
};
use live_grapher::types::{AccessPolicy, EngineEvent, TransportSpec};

const MAX_LOG_MESSAGES: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Live,
    File,
    Monitor,
}

// 串口监视器的快捷命令
const QUICK_COMMANDS: [(&str, &str); 4] = [
    ("Start Logging", "start_logging"),
    ("Stop Logging", "stop_logging"),
    ("Reset Device", "reset"),
    ("Get Status", "status"),
];

// 文件回放页的状态
struct FileView {
    path: String,
    save_path: String,
    table: Option<CsvTable>,
    frame: Option<FrameSnapshot>,
}

// 串口监视器页的状态
struct MonitorView {
    log_path: String,
    tag_text: String,
    tag_color: [u8; 3],
    auto_scroll: bool,
}

pub struct LiveGrapherApp {
    pipeline: SharedPipeline,
    connection: Option<Connection>,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,

    // 设置 (表单里编辑的是副本，点 Apply 才生效)
    settings: PanelSettings,
    settings_path: PathBuf,
    draft: PipelineConfig,
    use_simulation: bool,
    ports: Vec<String>,
    send_text: String,
    // 分图通道: 选中的条目与输入框的值
    split_selected: Option<usize>,
    split_value: usize,

    access: Box<dyn AccessPolicy>,
    selected_tab: Tab,
    file_view: FileView,
    monitor_view: MonitorView,
    log_messages: Vec<String>,
}

impl LiveGrapherApp {
    pub fn new(
        pipeline: SharedPipeline,
        settings: PanelSettings,
        settings_path: PathBuf,
        access: Box<dyn AccessPolicy>,
    ) -> Self {
        let (events_tx, events_rx) = channel();
        {
            let mut p = lock_pipeline(&pipeline);
            p.set_scale_mode(settings.scale_mode);
            p.set_fixed_bounds(settings.fixed_bounds());
        }
        Self {
            pipeline,
            connection: None,
            events_tx,
            events_rx,
            draft: settings.pipeline.clone(),
            settings,
            settings_path,
            use_simulation: true,
            ports: available_ports(),
            send_text: String::new(),
            split_selected: None,
            split_value: 5,
            access,
            selected_tab: Tab::Live,
            file_view: FileView {
                path: String::new(),
                save_path: String::from("graph_data_copy.csv"),
                table: None,
                frame: None,
            },
            monitor_view: MonitorView {
                log_path: DEFAULT_LOG_FILENAME.to_owned(),
                tag_text: String::new(),
                tag_color: [0x67, 0xd8, 0xef],
                auto_scroll: true,
            },
            log_messages: vec!["Live Grapher ready.".to_owned()],
        }
    }

    fn log(&mut self, msg: &str) {
        log::info!("{msg}");
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    fn report(&mut self, result: anyhow::Result<String>) {
        match result {
            Ok(msg) => self.log(&msg),
            Err(err) => {
                log::warn!("{err:#}");
                self.log(&format!("{err:#}"));
            }
        }
    }

    fn persist_settings(&mut self) {
        if let Err(err) = self.settings.save(&self.settings_path) {
            self.log(&format!("Could not save settings: {err}"));
        }
    }

    // ---------- 后台消息 ----------
    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                EngineEvent::Log(s) => self.log(&s),
                EngineEvent::Connected(label) => self.log(&format!("Connected: {label}")),
                EngineEvent::Disconnected(reason) => {
                    // 线程已经结束，join 不会阻塞
                    self.connection = None;
                    match reason {
                        Some(err) => self.log(&format!("Connection lost: {err}")),
                        None => self.log("Disconnected"),
                    }
                }
            }
        }
    }

    // ---------- 连接 ----------
    fn connect(&mut self) {
        let spec = if self.use_simulation {
            TransportSpec::Simulated {
                channels: self.settings.pipeline.channel_count,
                interval_ms: 16,
            }
        } else {
            TransportSpec::Serial {
                port: self.settings.port_name.clone(),
                baud: self.settings.baud_rate,
            }
        };
        match open_transport(&spec) {
            Ok(transport) => {
                self.connection = Some(Connection::start(
                    transport,
                    self.pipeline.clone(),
                    self.events_tx.clone(),
                ));
            }
            Err(err) => self.log(&format!("Connection failed: {err}")),
        }
    }

    fn disconnect(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.disconnect();
        }
    }

    // ---------- 录制与导出 ----------
    fn toggle_recording(&mut self) {
        let result = self.toggle_recording_inner();
        self.report(result);
    }

    fn toggle_recording_inner(&mut self) -> anyhow::Result<String> {
        let mut p = lock_pipeline(&self.pipeline);
        if !p.is_recording() {
            p.start_recording();
            return Ok("Recording started".to_owned());
        }
        let doc = p.stop_recording();
        drop(p);
        if doc.is_empty() {
            return Ok("Recording stopped, no data recorded".to_owned());
        }
        let filename = normalize_output_filename(&self.settings.output_filename);
        doc.save(&filename)
            .with_context(|| format!("failed to save recording to {filename}"))?;
        Ok(format!("Saved {} rows to {filename}", doc.rows))
    }

    fn save_live_csv(&mut self) {
        let result = (|| -> anyhow::Result<String> {
            let doc = match lock_pipeline(&self.pipeline).export_live() {
                Ok(doc) => doc,
                Err(GrapherError::NothingToExport) => return Ok("No data to save".to_owned()),
                Err(err) => return Err(err.into()),
            };
            let filename = live_snapshot_filename();
            doc.save(&filename)
                .with_context(|| format!("failed to save {filename}"))?;
            Ok(format!("Saved live data to {filename}"))
        })();
        self.report(result);
    }

    fn save_live_png(&mut self) {
        let style = PlotStyle {
            graph: self.settings.graph_style,
            ..PlotStyle::default()
        };
        let snapshot = lock_pipeline(&self.pipeline).snapshot();
        let result = (|| -> anyhow::Result<String> {
            if snapshot.is_empty() {
                return Ok("No data to save".to_owned());
            }
            let png = render_frame_png(&snapshot, style).context("failed to render chart")?;
            let filename = live_snapshot_filename().replace(".csv", ".png");
            fs::write(&filename, png).with_context(|| format!("failed to write {filename}"))?;
            Ok(format!("Saved chart to {filename}"))
        })();
        self.report(result);
    }

    // ---------- 串口监视器 ----------
    // 未连接时只回显，不发送
    fn send_command(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let sent = match &self.connection {
            Some(conn) => conn.send_line(text),
            None => {
                lock_pipeline(&self.pipeline).monitor_mut().push_sent(text);
                false
            }
        };
        if !sent {
            self.log(&format!("Not sent (no connection): {text}"));
        }
    }

    fn save_terminal_log(&mut self) {
        let result = (|| -> anyhow::Result<String> {
            let path = match self.monitor_view.log_path.trim() {
                "" => DEFAULT_LOG_FILENAME.to_owned(),
                other => other.to_owned(),
            };
            let p = lock_pipeline(&self.pipeline);
            if p.monitor().is_empty() {
                return Ok("Terminal is empty".to_owned());
            }
            p.monitor()
                .save(&path)
                .with_context(|| format!("failed to save {path}"))?;
            Ok(format!("Saved {} terminal lines to {path}", p.monitor().len()))
        })();
        self.report(result);
    }

    fn add_split_channel(&mut self) {
        let value = self.split_value;
        let result = lock_pipeline(&self.pipeline).channels_mut().split_mut().add(value);
        match result {
            Ok(()) => self.log(&format!("Channel {value} added to split")),
            Err(err) => self.log(&format!("Rejected: {err}")),
        }
    }

    fn save_split_channel(&mut self, index: usize) {
        let value = self.split_value;
        let result = lock_pipeline(&self.pipeline)
            .channels_mut()
            .split_mut()
            .edit(index, value);
        match result {
            Ok(()) => self.split_selected = None,
            Err(err) => self.log(&format!("Rejected: {err}")),
        }
    }

    // ---------- 配置 ----------
    fn apply_pipeline_config(&mut self) {
        let result = lock_pipeline(&self.pipeline).configure(self.draft.clone());
        match result {
            Ok(()) => {
                self.settings.pipeline = self.draft.clone();
                self.persist_settings();
                self.log("Settings applied");
            }
            Err(err) => {
                self.draft = self.settings.pipeline.clone();
                self.log(&format!("Rejected: {err}"));
            }
        }
    }

    fn apply_scale(&mut self) {
        let mut p = lock_pipeline(&self.pipeline);
        p.set_scale_mode(self.settings.scale_mode);
        if self.settings.fixed_min < self.settings.fixed_max {
            p.set_fixed_bounds(self.settings.fixed_bounds());
        } else {
            let prior = p.fixed_bounds();
            drop(p);
            self.settings.fixed_min = prior.min;
            self.settings.fixed_max = prior.max;
            self.log("Y max must be greater than Y min");
            return;
        }
        drop(p);
        self.persist_settings();
    }

    fn reset_settings(&mut self) {
        self.settings = PanelSettings::default();
        self.draft = self.settings.pipeline.clone();
        let result = lock_pipeline(&self.pipeline).configure(self.draft.clone());
        if let Err(err) = result {
            self.log(&format!("Reset failed: {err}"));
            return;
        }
        self.apply_scale();
        self.persist_settings();
        self.log("Settings reset to defaults");
    }

    // ---------- 文件回放 ----------
    fn load_file(&mut self) {
        let path = self.file_view.path.trim().to_owned();
        let result = (|| -> anyhow::Result<CsvTable> {
            if path.is_empty() {
                bail!("enter a CSV path first");
            }
            let text =
                fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
            Ok(CsvTable::parse(&text)?)
        })();
        match result {
            Ok(table) => {
                let names = table.channel_names();
                let colors = ChannelSet::new(names.len()).colors();
                let range = table.value_range().unwrap_or(ValueRange::new(0.0, 1.0));
                self.file_view.frame = Some(FrameSnapshot::from_table(
                    table.rows.clone(),
                    names,
                    colors,
                    range,
                ));
                self.log(&format!("Loaded {} rows from {path}", table.rows.len()));
                self.file_view.table = Some(table);
            }
            Err(err) => self.report(Err(err)),
        }
    }

    fn save_file_copy(&mut self) {
        let result = (|| -> anyhow::Result<String> {
            let Some(table) = &self.file_view.table else {
                return Ok("No data to save".to_owned());
            };
            let filename = normalize_output_filename(&self.file_view.save_path);
            fs::write(&filename, table.to_csv())
                .with_context(|| format!("failed to write {filename}"))?;
            Ok(format!("Saved {filename}"))
        })();
        self.report(result);
    }

    // ---------- 快捷键 ----------
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if self.selected_tab == Tab::Monitor {
            let (clear, scroll) = ctx.input(|i| {
                let cmd = i.modifiers.command;
                (cmd && i.key_pressed(egui::Key::L), cmd && i.key_pressed(egui::Key::A))
            });
            if clear {
                lock_pipeline(&self.pipeline).monitor_mut().clear();
            }
            if scroll {
                self.monitor_view.auto_scroll = !self.monitor_view.auto_scroll;
            }
            return;
        }
        if self.selected_tab != Tab::Live {
            return;
        }
        let (space, clear, record, save, digits) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let digits: Vec<usize> = [
                egui::Key::Num1,
                egui::Key::Num2,
                egui::Key::Num3,
                egui::Key::Num4,
                egui::Key::Num5,
                egui::Key::Num6,
                egui::Key::Num7,
                egui::Key::Num8,
                egui::Key::Num9,
            ]
            .iter()
            .enumerate()
            .filter(|(_, key)| !cmd && i.key_pressed(**key))
            .map(|(idx, _)| idx)
            .collect();
            (
                !cmd && i.key_pressed(egui::Key::Space),
                !cmd && i.key_pressed(egui::Key::C),
                cmd && i.key_pressed(egui::Key::R),
                cmd && i.key_pressed(egui::Key::S),
                digits,
            )
        });
        {
            let mut p = lock_pipeline(&self.pipeline);
            if space {
                p.toggle_pause();
            }
            if clear {
                p.clear();
            }
            for idx in digits {
                p.channels_mut().toggle(idx);
            }
        }
        if record {
            self.toggle_recording();
        }
        if save {
            self.save_live_csv();
        }
    }

    // ---------- 界面 ----------
    fn sidebar(&mut self, ui: &mut egui::Ui, snapshot: &FrameSnapshot) {
        ui.add_space(10.0);
        ui.heading("Live Grapher");
        ui.separator();

        // 录制
        ui.label("RECORD GRAPH DATA");
        let rec_text = if snapshot.recording { "⏹ Stop Recording" } else { "🔴 Start Recording" };
        let rec_col = if snapshot.recording { Color32::RED } else { Color32::DARK_GRAY };
        if ui
            .add(egui::Button::new(RichText::new(rec_text).color(Color32::WHITE)).fill(rec_col))
            .clicked()
        {
            self.toggle_recording();
        }
        ui.horizontal(|ui| {
            ui.label("File:");
            if ui.text_edit_singleline(&mut self.settings.output_filename).lost_focus() {
                self.settings.output_filename =
                    normalize_output_filename(&self.settings.output_filename);
                self.persist_settings();
            }
        });
        if snapshot.recording {
            ui.label(
                RichText::new(format!("Recording... {} samples", snapshot.recorded_len))
                    .color(Color32::RED)
                    .small(),
            );
        }
        ui.label(RichText::new("Ctrl+R to toggle recording").small());
        ui.separator();

        // 图表选项
        ui.label("GRAPH OPTIONS");
        let mut style = self.settings.graph_style;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut style, GraphStyle::Line, "Line");
            ui.selectable_value(&mut style, GraphStyle::Dots, "Dots");
            ui.selectable_value(&mut style, GraphStyle::Bars, "Bars");
        });
        if style != self.settings.graph_style {
            self.settings.graph_style = style;
            self.persist_settings();
        }
        ui.horizontal(|ui| {
            let paused = snapshot.state == LinkState::Paused;
            if ui.button(if paused { "▶ Resume" } else { "⏸ Pause" }).clicked() {
                lock_pipeline(&self.pipeline).toggle_pause();
            }
            if ui.button("Clear").clicked() {
                lock_pipeline(&self.pipeline).clear();
            }
        });
        let mut scale_changed = false;
        ui.horizontal(|ui| {
            for (mode, text) in [
                (ScaleMode::AutoExpand, "Auto"),
                (ScaleMode::ExpandOnly, "Expand"),
                (ScaleMode::Fixed, "Fixed"),
            ] {
                scale_changed |= ui
                    .selectable_value(&mut self.settings.scale_mode, mode, text)
                    .changed();
            }
        });
        ui.horizontal(|ui| {
            ui.label("Y min");
            scale_changed |= ui
                .add(egui::DragValue::new(&mut self.settings.fixed_min).speed(1.0))
                .lost_focus();
            ui.label("Y max");
            scale_changed |= ui
                .add(egui::DragValue::new(&mut self.settings.fixed_max).speed(1.0))
                .lost_focus();
        });
        if scale_changed {
            self.apply_scale();
        }
        ui.label(format!(
            "Range: {} .. {}",
            format_axis_label(snapshot.range.min),
            format_axis_label(snapshot.range.max)
        ));
        let split: Vec<usize> = lock_pipeline(&self.pipeline)
            .channels()
            .split()
            .entries()
            .to_vec();
        ui.horizontal_wrapped(|ui| {
            ui.label("Split:");
            for (idx, channel) in split.iter().enumerate() {
                let selected = self.split_selected == Some(idx);
                if ui.selectable_label(selected, channel.to_string()).clicked() {
                    self.split_selected = if selected { None } else { Some(idx) };
                    self.split_value = *channel;
                }
            }
        });
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut self.split_value).clamp_range(1..=MAX_SPLIT_CHANNEL));
            match self.split_selected {
                Some(idx) => {
                    if ui.button("Save").clicked() {
                        self.save_split_channel(idx);
                    }
                    if ui.button("Remove").clicked() {
                        lock_pipeline(&self.pipeline).channels_mut().split_mut().remove(idx);
                        self.split_selected = None;
                    }
                }
                None => {
                    if ui.button("+").clicked() {
                        self.add_split_channel();
                    }
                }
            }
        });
        ui.separator();

        // 通道
        ui.label("CHANNELS");
        ui.horizontal(|ui| {
            if ui.button("Toggle Hidden").clicked() {
                lock_pipeline(&self.pipeline).channels_mut().toggle_hidden();
            }
            if ui.button("Toggle Empty").clicked() {
                lock_pipeline(&self.pipeline).toggle_empty_channels();
            }
        });
        egui::ScrollArea::vertical()
            .id_source("channels")
            .max_height(220.0)
            .show(ui, |ui| {
                for idx in 0..snapshot.channel_count() {
                    let [r, g, b] = snapshot.colors[idx];
                    let mut visible = snapshot.is_visible(idx);
                    let mut name = snapshot.names[idx].clone();
                    let value = snapshot.latest.get(idx).copied().unwrap_or_default();
                    ui.horizontal(|ui| {
                        if ui.checkbox(&mut visible, "").changed() {
                            lock_pipeline(&self.pipeline).channels_mut().set_visible(idx, visible);
                        }
                        ui.label(RichText::new("■").color(Color32::from_rgb(r, g, b)));
                        let edit = ui.add(egui::TextEdit::singleline(&mut name).desired_width(90.0));
                        if edit.changed() {
                            lock_pipeline(&self.pipeline).channels_mut().rename(idx, name);
                        }
                        ui.monospace(format!("{value:>9.2}"));
                    });
                }
            });
        ui.separator();

        // 串口设置
        ui.label("SERIAL SETTINGS");
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.use_simulation, true, "SIM");
            ui.selectable_value(&mut self.use_simulation, false, "SERIAL");
        });
        if !self.use_simulation {
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_source("port")
                    .selected_text(if self.settings.port_name.is_empty() {
                        "Select port"
                    } else {
                        self.settings.port_name.as_str()
                    })
                    .show_ui(ui, |ui| {
                        for port in &self.ports {
                            ui.selectable_value(&mut self.settings.port_name, port.clone(), port);
                        }
                    });
                if ui.button("⟳").clicked() {
                    self.ports = available_ports();
                }
            });
            ui.horizontal(|ui| {
                ui.label("Baud");
                ui.add(egui::DragValue::new(&mut self.settings.baud_rate).clamp_range(300..=250_000));
            });
        }
        ui.horizontal(|ui| {
            ui.label("Max samples");
            ui.add(egui::DragValue::new(&mut self.draft.max_samples).clamp_range(1..=100_000));
        });
        ui.horizontal(|ui| {
            ui.label("Channels");
            ui.add(egui::DragValue::new(&mut self.draft.channel_count).clamp_range(1..=64));
        });
        ui.add(egui::Slider::new(&mut self.draft.smoothing_factor, 0.0..=0.99).text("Smoothing"));
        if ui.button("Apply").clicked() {
            self.apply_pipeline_config();
        }

        let connected = self.connection.is_some();
        if ui.button(if connected { "DISCONNECT" } else { "CONNECT" }).clicked() {
            if connected {
                self.disconnect();
            } else {
                self.persist_settings();
                self.connect();
            }
        }
        if connected {
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.send_text);
                if ui.button("Send").clicked() {
                    let text = std::mem::take(&mut self.send_text);
                    self.send_command(&text);
                }
            });
        }
        ui.label(format!("Data rate: {:.1} Hz", snapshot.data_rate));
        ui.horizontal(|ui| {
            if ui.button("💾 Save CSV").clicked() {
                self.save_live_csv();
            }
            if ui.button("🖼 Save PNG").clicked() {
                self.save_live_png();
            }
        });

        if self.access.is_privileged() {
            ui.separator();
            if ui.button(RichText::new("Reset settings").color(Color32::YELLOW)).clicked() {
                self.reset_settings();
            }
        }

        ui.add_space(10.0);
        egui::ScrollArea::vertical()
            .id_source("log")
            .max_height(100.0)
            .show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
    }

    fn file_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("CSV file:");
            ui.text_edit_singleline(&mut self.file_view.path);
            if ui.button("Load").clicked() {
                self.load_file();
            }
            if ui.button("Clear").clicked() {
                self.file_view.table = None;
                self.file_view.frame = None;
            }
        });
        ui.horizontal(|ui| {
            ui.label("Save as:");
            ui.text_edit_singleline(&mut self.file_view.save_path);
            if ui.button("Save").clicked() {
                self.save_file_copy();
            }
        });
        match &self.file_view.frame {
            Some(frame) => {
                ui.label(format!("{} rows, {} columns", frame.len(), frame.channel_count()));
                // 回放数据按行号作横轴
                draw_plot(ui, "file_plot", frame, self.settings.graph_style);
            }
            None => {
                ui.label("Load a recorded CSV to view it.");
            }
        }
    }

    fn monitor_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Clear Terminal").clicked() {
                lock_pipeline(&self.pipeline).monitor_mut().clear();
            }
            ui.checkbox(&mut self.monitor_view.auto_scroll, "Autoscroll");
            ui.separator();
            ui.label("Log file:");
            ui.add(egui::TextEdit::singleline(&mut self.monitor_view.log_path).desired_width(140.0));
            if ui.button("💾 Save Log").clicked() {
                self.save_terminal_log();
            }
        });
        ui.horizontal(|ui| {
            for (label, command) in QUICK_COMMANDS {
                if ui.button(label).clicked() {
                    self.send_command(command);
                }
            }
        });

        // 颜色标签
        let tags: Vec<(String, [u8; 3])> = lock_pipeline(&self.pipeline)
            .monitor()
            .tags()
            .iter()
            .map(|t| (t.text.clone(), t.color))
            .collect();
        ui.horizontal_wrapped(|ui| {
            ui.label("Tags:");
            for (idx, (text, [r, g, b])) in tags.iter().enumerate() {
                ui.label(RichText::new(text).monospace().color(Color32::from_rgb(*r, *g, *b)));
                if ui.small_button("✕").clicked() {
                    lock_pipeline(&self.pipeline).monitor_mut().remove_tag(idx);
                }
            }
            ui.add(egui::TextEdit::singleline(&mut self.monitor_view.tag_text).desired_width(80.0));
            ui.color_edit_button_srgb(&mut self.monitor_view.tag_color);
            if ui.button("Add Tag").clicked() {
                let added = lock_pipeline(&self.pipeline)
                    .monitor_mut()
                    .add_tag(&self.monitor_view.tag_text, self.monitor_view.tag_color);
                if added {
                    self.monitor_view.tag_text.clear();
                }
            }
        });
        ui.separator();

        // 发送框放在终端上方，终端占满剩余空间
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.send_text)
                    .hint_text("Type and press Enter to send"),
            );
            let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Send").clicked() || enter {
                let text = std::mem::take(&mut self.send_text);
                self.send_command(&text);
            }
        });

        let font = egui::FontId::monospace(12.0);
        let jobs: Vec<egui::text::LayoutJob> = {
            let p = lock_pipeline(&self.pipeline);
            let monitor = p.monitor();
            monitor
                .lines()
                .map(|line| {
                    let mut job = egui::text::LayoutJob::default();
                    for (piece, color) in monitor.spans(line) {
                        let color = color
                            .map(|[r, g, b]| Color32::from_rgb(r, g, b))
                            .unwrap_or(Color32::LIGHT_GRAY);
                        job.append(
                            piece,
                            0.0,
                            egui::TextFormat {
                                font_id: font.clone(),
                                color,
                                ..Default::default()
                            },
                        );
                    }
                    job
                })
                .collect()
        };
        egui::ScrollArea::vertical()
            .id_source("terminal")
            .auto_shrink([false, false])
            .stick_to_bottom(self.monitor_view.auto_scroll)
            .show(ui, |ui| {
                for job in jobs {
                    ui.label(job);
                }
            });
    }
}

// 一帧快照画到 egui_plot 上，纵轴用快照自己的量程
fn draw_plot(ui: &mut egui::Ui, id: &str, frame: &FrameSnapshot, style: GraphStyle) {
    let x_max = frame.time_span().max(1.0);
    let bar_width = (x_max / frame.len().max(1) as f64) * 0.8;
    Plot::new(id)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [0.0, frame.range.min],
                [x_max, frame.range.max],
            ));
            for ch in (0..frame.channel_count()).filter(|c| frame.is_visible(*c)) {
                let [r, g, b] = frame.colors.get(ch).copied().unwrap_or([255, 255, 255]);
                let color = Color32::from_rgb(r, g, b);
                let name = frame.names.get(ch).cloned().unwrap_or_default();
                let series = frame.series(ch);
                match style {
                    GraphStyle::Line => {
                        plot_ui.line(Line::new(PlotPoints::from(series)).color(color).name(name));
                    }
                    GraphStyle::Dots => {
                        plot_ui.points(
                            Points::new(PlotPoints::from(series))
                                .radius(2.0)
                                .color(color)
                                .name(name),
                        );
                    }
                    GraphStyle::Bars => {
                        let bars = series
                            .iter()
                            .map(|p| Bar::new(p[0], p[1]).width(bar_width))
                            .collect();
                        plot_ui.bar_chart(BarChart::new(bars).color(color).name(name));
                    }
                }
            }
        });
}

impl eframe::App for LiveGrapherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 后台消息
        self.drain_events();

        // 2. 快捷键
        self.handle_shortcuts(ctx);

        // 3. 每帧取一次快照 (顺带推进速率窗口)
        let snapshot = {
            let mut p = lock_pipeline(&self.pipeline);
            p.tick(Instant::now());
            p.snapshot()
        };
        if self.connection.is_some() {
            ctx.request_repaint();
        }

        // 4. UI 绘制
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::SidePanel::left("L").min_width(300.0).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.sidebar(ui, &snapshot);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Live, "Live Graph");
                ui.selectable_value(&mut self.selected_tab, Tab::File, "File Graph");
                ui.selectable_value(&mut self.selected_tab, Tab::Monitor, "Serial Monitor");
            });
            ui.separator();
            match self.selected_tab {
                Tab::Live => {
                    ui.horizontal(|ui| match snapshot.state {
                        LinkState::Idle => {
                            ui.label("Connect first.");
                        }
                        LinkState::Paused => {
                            ui.label(RichText::new("PAUSED").strong().color(Color32::YELLOW));
                        }
                        LinkState::Streaming => {
                            ui.label(RichText::new("Space: pause  C: clear  1-9: channels").small());
                        }
                    });
                    draw_plot(ui, "live_plot", &snapshot, self.settings.graph_style);
                }
                Tab::File => self.file_tab(ui),
                Tab::Monitor => self.monitor_tab(ui),
            }
        });
    }
}
