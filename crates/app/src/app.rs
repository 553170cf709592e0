use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui;

use texhtml_bundle::{BundleError, DocumentKind, DocumentPayload, EncodedBundle, BUNDLE_EXTENSION};
use texhtml_model::{
    apply_layout_action, apply_manifest_layout, shortcut_action, DividerDrag, LayoutAction,
    LayoutState, Orientation, Shortcut, ShortcutAction, ShortcutKey, Theme, ViewMode, SHORTCUTS,
};
use texhtml_storage::{load_layout, persist_layout, FileStore, MemoryStore, SettingsStore};

use crate::panes::{
    paper_zoom_fragment, pointer_offset_and_extent, resize_cursor, split_rects, PaneRects,
};
use crate::recent::RecentBundles;

pub struct TexhtmlApp {
    layout: LayoutState,
    store: Box<dyn SettingsStore>,

    // Session-scoped document handles; replaced wholesale on load, which
    // drops the previous buffers.
    paper: Option<DocumentPayload>,
    markup: Option<DocumentPayload>,

    drag: DividerDrag,
    // Mirrors the host's fullscreen notification, not our requests.
    fullscreen: bool,
    help_visible: bool,
    error_dialog: Option<ErrorDialogState>,
    recent: RecentBundles,
    last_title: String,
}

struct ErrorDialogState {
    severity: ErrorSeverity,
    message: String,
}

#[derive(Clone, Copy, PartialEq)]
enum ErrorSeverity {
    Error,
    Info,
}

impl ErrorSeverity {
    fn title(&self) -> &'static str {
        match self {
            ErrorSeverity::Error => "❌ Error",
            ErrorSeverity::Info => "ℹ️ Notice",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropKind {
    Bundle,
    Paper,
    Markup,
}

/// Classifies a picked or dropped file by declared media type first, file
/// suffix second.
fn classify_drop(name: &str, mime: &str) -> Option<DropKind> {
    let name = name.to_ascii_lowercase();

    if name.ends_with(".texhtml") {
        return Some(DropKind::Bundle);
    }
    if mime == "application/pdf" || name.ends_with(".pdf") {
        return Some(DropKind::Paper);
    }
    if mime.contains("html") || name.ends_with(".html") || name.ends_with(".htm") {
        return Some(DropKind::Markup);
    }

    None
}

impl TexhtmlApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let store: Box<dyn SettingsStore> = match FileStore::from_default_project() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("settings storage unavailable, falling back to in-memory: {e}");
                Box::new(MemoryStore::new())
            }
        };

        let layout = load_layout(store.as_ref());

        let mut recent = RecentBundles::new();
        if let Err(e) = recent.load() {
            log::warn!("could not load recent bundles: {e}");
        }

        Self {
            layout,
            store,
            paper: None,
            markup: None,
            drag: DividerDrag::new(),
            fullscreen: false,
            help_visible: false,
            error_dialog: None,
            recent,
            last_title: String::new(),
        }
    }

    fn apply(&mut self, action: LayoutAction) {
        apply_layout_action(&mut self.layout, action);
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = persist_layout(self.store.as_mut(), &self.layout) {
            log::warn!("could not persist layout settings: {e}");
        }
    }

    fn show_error(&mut self, severity: ErrorSeverity, message: impl Into<String>) {
        self.error_dialog = Some(ErrorDialogState { severity, message: message.into() });
    }

    // --- document loading ---------------------------------------------------

    fn open_file_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("texhtml bundle", &[BUNDLE_EXTENSION])
            .add_filter("PDF", &["pdf"])
            .add_filter("HTML", &["html", "htm"])
            .pick_file();

        if let Some(path) = picked {
            self.open_path(path);
        }
    }

    fn open_path(&mut self, path: PathBuf) {
        match classify_drop(&path.to_string_lossy(), "") {
            Some(DropKind::Bundle) => self.open_bundle_path(path),
            Some(DropKind::Paper) => self.load_document(path, DocumentKind::Paper),
            Some(DropKind::Markup) => self.load_document(path, DocumentKind::App),
            None => {
                self.show_error(
                    ErrorSeverity::Info,
                    format!("Unsupported file type: {}", path.display()),
                );
            }
        }
    }

    fn open_bundle_path(&mut self, path: PathBuf) {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.show_error(
                    ErrorSeverity::Error,
                    format!("Could not read {}: {e}", path.display()),
                );
                return;
            }
        };

        match self.open_bundle_bytes(&bytes) {
            Ok(()) => self.remember_recent(&path),
            Err(e) => self.show_error(ErrorSeverity::Error, format!("Could not open bundle: {e}")),
        }
    }

    /// Decodes a bundle and, on success only, replaces the loaded documents
    /// and applies the manifest's layout fields.
    fn open_bundle_bytes(&mut self, bytes: &[u8]) -> Result<(), BundleError> {
        let bundle = texhtml_bundle::decode(bytes)?;

        apply_manifest_layout(&mut self.layout, &bundle.manifest);
        self.persist();

        self.paper = Some(bundle.paper);
        self.markup = Some(bundle.app);

        Ok(())
    }

    fn load_document(&mut self, path: PathBuf, kind: DocumentKind) {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.show_error(
                    ErrorSeverity::Error,
                    format!("Could not read {}: {e}", path.display()),
                );
                return;
            }
        };

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_owned());

        self.set_document(DocumentPayload::new(name, kind, bytes));
        self.remember_recent(&path);
    }

    fn set_document(&mut self, payload: DocumentPayload) {
        match payload.kind {
            DocumentKind::Paper => self.paper = Some(payload),
            DocumentKind::App => self.markup = Some(payload),
        }
    }

    fn remember_recent(&mut self, path: &Path) {
        self.recent.add(path);
        if let Err(e) = self.recent.save() {
            log::warn!("could not save recent bundles: {e}");
        }
    }

    // --- saving -------------------------------------------------------------

    fn encode_current(&self) -> Result<EncodedBundle, BundleError> {
        let (Some(paper), Some(markup)) = (&self.paper, &self.markup) else {
            return Err(BundleError::PreconditionFailure);
        };

        // A markup document that only ever existed as a live session
        // reference has no captured bytes to archive.
        if markup.bytes.is_empty() {
            return Err(BundleError::ContentCaptureFailure);
        }

        texhtml_bundle::encode(None, &self.layout, paper, markup)
    }

    fn save_bundle(&mut self) {
        let encoded = match self.encode_current() {
            Ok(encoded) => encoded,
            Err(e) => {
                self.show_error(ErrorSeverity::Error, e.to_string());
                return;
            }
        };

        let picked = rfd::FileDialog::new()
            .add_filter("texhtml bundle", &[BUNDLE_EXTENSION])
            .set_file_name(&encoded.suggested_filename)
            .save_file();

        if let Some(path) = picked {
            match fs::write(&path, &encoded.bytes) {
                Ok(()) => self.remember_recent(&path),
                Err(e) => self.show_error(
                    ErrorSeverity::Error,
                    format!("Could not write {}: {e}", path.display()),
                ),
            }
        }
    }

    // --- input --------------------------------------------------------------

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let mut fired = None;

        ctx.input_mut(|input| {
            for shortcut in SHORTCUTS {
                let modifiers =
                    if shortcut.command { egui::Modifiers::COMMAND } else { egui::Modifiers::NONE };

                if input.consume_key(modifiers, egui_key(shortcut.key)) {
                    fired = shortcut_action(shortcut.command, shortcut.key);
                    break;
                }
            }
        });

        if let Some(action) = fired {
            self.handle_shortcut(action, ctx);
        }
    }

    fn handle_shortcut(&mut self, action: ShortcutAction, ctx: &egui::Context) {
        match action {
            ShortcutAction::SetViewMode(mode) => self.apply(LayoutAction::SetViewMode(mode)),
            ShortcutAction::ToggleTheme => self.apply(LayoutAction::ToggleTheme),
            ShortcutAction::ToggleSwap => self.apply(LayoutAction::ToggleSwap),
            ShortcutAction::ToggleToolbar => self.apply(LayoutAction::ToggleToolbar),
            ShortcutAction::ToggleOrientation => {
                self.apply(LayoutAction::SetOrientation(self.layout.orientation.flipped()));
            }
            ShortcutAction::ToggleFullscreen => {
                // Fire-and-forget; `self.fullscreen` follows the host's own
                // change notification, not this request.
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!self.fullscreen));
            }
            ShortcutAction::ToggleHelp => self.help_visible = !self.help_visible,
            ShortcutAction::DismissOverlay => {
                if self.error_dialog.is_some() {
                    self.error_dialog = None;
                } else {
                    self.help_visible = false;
                }
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let mut paper_taken = false;
        let mut markup_taken = false;

        for file in &dropped {
            let display_name = file
                .path
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.name.clone());

            let Some(kind) = classify_drop(&display_name, &file.mime) else {
                continue;
            };

            match kind {
                DropKind::Bundle => {
                    if let Some(path) = &file.path {
                        self.open_bundle_path(path.clone());
                    } else if let Some(bytes) = dropped_bytes(file) {
                        if let Err(e) = self.open_bundle_bytes(&bytes) {
                            self.show_error(
                                ErrorSeverity::Error,
                                format!("Could not open bundle: {e}"),
                            );
                        }
                    }
                    return;
                }
                DropKind::Paper if !paper_taken => {
                    self.accept_dropped_document(file, DocumentKind::Paper);
                    paper_taken = true;
                }
                DropKind::Markup if !markup_taken => {
                    self.accept_dropped_document(file, DocumentKind::App);
                    markup_taken = true;
                }
                // At most one of each kind per drop event; extras ignored.
                _ => {}
            }
        }
    }

    fn accept_dropped_document(&mut self, file: &egui::DroppedFile, kind: DocumentKind) {
        if let Some(path) = &file.path {
            self.load_document(path.clone(), kind);
        } else if let Some(bytes) = dropped_bytes(file) {
            self.set_document(DocumentPayload::new(file.name.clone(), kind, bytes));
        } else {
            log::warn!("dropped file {:?} carried neither path nor bytes", file.name);
        }
    }

    // --- frame --------------------------------------------------------------

    fn sync_fullscreen(&mut self, ctx: &egui::Context) {
        self.fullscreen = ctx.input(|input| input.viewport().fullscreen.unwrap_or(false));
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        match self.layout.theme {
            Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
            Theme::Light => ctx.set_visuals(egui::Visuals::light()),
        }
    }

    fn sync_window_title(&mut self, ctx: &egui::Context) {
        let title = match (&self.paper, &self.markup) {
            (Some(paper), _) => format!("texhtml — {}", paper.name),
            (None, Some(markup)) => format!("texhtml — {}", markup.name),
            (None, None) => "texhtml".to_owned(),
        };

        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }
    }
}

fn dropped_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    file.bytes.as_ref().map(|bytes| bytes.to_vec())
}

fn egui_key(key: ShortcutKey) -> egui::Key {
    match key {
        ShortcutKey::Num1 => egui::Key::Num1,
        ShortcutKey::Num2 => egui::Key::Num2,
        ShortcutKey::Num3 => egui::Key::Num3,
        ShortcutKey::B => egui::Key::B,
        ShortcutKey::F => egui::Key::F,
        ShortcutKey::O => egui::Key::O,
        ShortcutKey::T => egui::Key::T,
        ShortcutKey::X => egui::Key::X,
        ShortcutKey::F1 => egui::Key::F1,
        ShortcutKey::Escape => egui::Key::Escape,
    }
}

fn key_name(key: ShortcutKey) -> &'static str {
    match key {
        ShortcutKey::Num1 => "1",
        ShortcutKey::Num2 => "2",
        ShortcutKey::Num3 => "3",
        ShortcutKey::B => "B",
        ShortcutKey::F => "F",
        ShortcutKey::O => "O",
        ShortcutKey::T => "T",
        ShortcutKey::X => "X",
        ShortcutKey::F1 => "F1",
        ShortcutKey::Escape => "Esc",
    }
}

fn shortcut_label(shortcut: &Shortcut) -> String {
    if shortcut.command {
        format!("Ctrl+{}", key_name(shortcut.key))
    } else {
        key_name(shortcut.key).to_owned()
    }
}

fn view_mode_label(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Split => "Split",
        ViewMode::Paper => "Paper",
        ViewMode::App => "App",
    }
}

fn orientation_label(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Horizontal => "Horizontal",
        Orientation::Vertical => "Vertical",
    }
}

impl eframe::App for TexhtmlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_fullscreen(ctx);
        self.apply_theme(ctx);
        self.sync_window_title(ctx);
        self.handle_keyboard(ctx);
        self.handle_dropped_files(ctx);

        if self.layout.toolbar_visible {
            self.draw_toolbar(ctx);
        }
        self.draw_panes(ctx);
        self.draw_help_overlay(ctx);
        self.draw_error_dialog(ctx);
    }
}

impl TexhtmlApp {
    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                if ui.button("📂 Open…").clicked() {
                    self.open_file_dialog();
                }

                ui.menu_button("Recent", |ui| {
                    if self.recent.is_empty() {
                        ui.weak("No recent files");
                        return;
                    }

                    let mut picked = None;
                    for path in self.recent.paths() {
                        let label = path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string());
                        if ui.button(label).clicked() {
                            picked = Some(path.clone());
                        }
                    }

                    ui.separator();
                    if ui.button("Clear").clicked() {
                        self.recent.clear();
                        if let Err(e) = self.recent.save() {
                            log::warn!("could not save recent bundles: {e}");
                        }
                    }

                    if let Some(path) = picked {
                        ui.close_menu();
                        self.open_path(path);
                    }
                });

                if ui.button("💾 Save Bundle…").clicked() {
                    self.save_bundle();
                }

                ui.separator();

                for mode in [ViewMode::Split, ViewMode::Paper, ViewMode::App] {
                    let selected = self.layout.view_mode == mode;
                    if ui.selectable_label(selected, view_mode_label(mode)).clicked() {
                        self.apply(LayoutAction::SetViewMode(mode));
                    }
                }

                ui.separator();

                if ui
                    .button(orientation_label(self.layout.orientation))
                    .on_hover_text("Toggle split orientation")
                    .clicked()
                {
                    self.apply(LayoutAction::SetOrientation(self.layout.orientation.flipped()));
                }

                if ui.selectable_label(self.layout.swapped, "⇄ Swap").clicked() {
                    self.apply(LayoutAction::ToggleSwap);
                }

                ui.separator();

                if ui.button("−").clicked() {
                    self.apply(LayoutAction::ZoomOut);
                }
                ui.label(format!("{}%", self.layout.pdf_zoom_percent));
                if ui.button("+").clicked() {
                    self.apply(LayoutAction::ZoomIn);
                }

                ui.separator();

                let theme_icon = match self.layout.theme {
                    Theme::Dark => "☀ Light",
                    Theme::Light => "🌙 Dark",
                };
                if ui.button(theme_icon).clicked() {
                    self.apply(LayoutAction::ToggleTheme);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("?").on_hover_text("Keyboard shortcuts (F1)").clicked() {
                        self.help_visible = !self.help_visible;
                    }
                });
            });
        });
    }

    fn draw_panes(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
            let container = ui.available_rect_before_wrap();

            match self.layout.view_mode {
                ViewMode::Paper => self.draw_paper_pane(ui, container),
                ViewMode::App => self.draw_markup_pane(ui, container),
                ViewMode::Split => {
                    let rects: PaneRects =
                        split_rects(container, self.layout.orientation, self.layout.split_percent);

                    if self.layout.swapped {
                        self.draw_markup_pane(ui, rects.first);
                        self.draw_paper_pane(ui, rects.second);
                    } else {
                        self.draw_paper_pane(ui, rects.first);
                        self.draw_markup_pane(ui, rects.second);
                    }

                    self.handle_divider(ui, container, rects.divider);
                }
            }
        });
    }

    fn handle_divider(&mut self, ui: &mut egui::Ui, container: egui::Rect, divider: egui::Rect) {
        let response = ui.interact(divider, ui.id().with("divider"), egui::Sense::drag());

        if response.drag_started() {
            self.drag.press();
        }

        if response.hovered() || self.drag.is_dragging() {
            ui.ctx()
                .output_mut(|output| output.cursor_icon = resize_cursor(self.layout.orientation));
        }

        if self.drag.is_dragging() {
            if let Some(pointer) = ui.ctx().input(|input| input.pointer.latest_pos()) {
                let (offset, extent) =
                    pointer_offset_and_extent(container, self.layout.orientation, pointer);

                if let Some(split) = self.drag.pointer_moved(offset, extent) {
                    if split != self.layout.split_percent {
                        self.apply(LayoutAction::SetSplitPercent(split as f32));
                    }
                }
            }

            // Release is observed globally so a fast drag that leaves the
            // divider's hit area cannot get stuck.
            if ui.ctx().input(|input| input.pointer.any_released()) {
                self.drag.release();
            }
        }

        let fill = if self.drag.is_dragging() {
            ui.visuals().selection.bg_fill
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        ui.painter().rect_filled(divider.shrink2(egui::vec2(1.0, 1.0)), 2.0, fill);
    }

    fn draw_paper_pane(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect.shrink(2.0), 4.0, ui.visuals().extreme_bg_color);

        match &self.paper {
            Some(doc) => {
                painter.text(
                    rect.center() - egui::vec2(0.0, 16.0),
                    egui::Align2::CENTER_CENTER,
                    format!("📄 {}", doc.name),
                    egui::FontId::proportional(18.0),
                    ui.visuals().strong_text_color(),
                );
                painter.text(
                    rect.center() + egui::vec2(0.0, 12.0),
                    egui::Align2::CENTER_CENTER,
                    format!(
                        "{} KiB · {}",
                        doc.bytes.len() / 1024,
                        paper_zoom_fragment(self.layout.pdf_zoom_percent)
                    ),
                    egui::FontId::proportional(13.0),
                    ui.visuals().weak_text_color(),
                );
            }
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Drop a PDF here or use Open…",
                    egui::FontId::proportional(15.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }
    }

    fn draw_markup_pane(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect.shrink(2.0), 4.0, ui.visuals().faint_bg_color);

        match &self.markup {
            Some(doc) => {
                painter.text(
                    rect.center() - egui::vec2(0.0, 16.0),
                    egui::Align2::CENTER_CENTER,
                    format!("🌐 {}", doc.name),
                    egui::FontId::proportional(18.0),
                    ui.visuals().strong_text_color(),
                );
                painter.text(
                    rect.center() + egui::vec2(0.0, 12.0),
                    egui::Align2::CENTER_CENTER,
                    format!("{} KiB", doc.bytes.len() / 1024),
                    egui::FontId::proportional(13.0),
                    ui.visuals().weak_text_color(),
                );
            }
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Drop an HTML document here or use Open…",
                    egui::FontId::proportional(15.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }
    }

    fn draw_help_overlay(&mut self, ctx: &egui::Context) {
        if !self.help_visible {
            return;
        }

        let mut open = true;
        egui::Window::new("Keyboard Shortcuts")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("shortcut_grid").num_columns(2).spacing([24.0, 4.0]).show(
                    ui,
                    |ui| {
                        for shortcut in SHORTCUTS {
                            ui.monospace(shortcut_label(shortcut));
                            ui.label(shortcut.label);
                            ui.end_row();
                        }
                    },
                );
            });

        if !open {
            self.help_visible = false;
        }
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.error_dialog else {
            return;
        };

        let title = dialog.severity.title();
        let message = dialog.message.clone();

        let mut should_close = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.error_dialog = None;
        }
    }
}
