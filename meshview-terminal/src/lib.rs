/// Terminal mesh viewer: rotate, zoom, pick, delete, and export
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use meshview_core::transform::{AUTO_ROTATE_INTERVAL_MS, ZOOM_FACTOR};
use meshview_core::{
    delete_selected, obj, Mesh, ScaleAdjustment, Selection, SelectionMode, ViewState,
};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod renderer;

pub use renderer::{cell_to_screen, AsciiRenderer, CELL_HEIGHT, CELL_WIDTH};

/// Radians turned per arrow key press
const KEY_ROTATE_STEP: f64 = 0.1;

/// One entry of the model list
pub struct Model {
    pub mesh: Mesh,
    pub source: Option<PathBuf>,
}

/// Main application struct for the terminal mesh viewer
pub struct TerminalApp {
    models: Vec<Model>,
    active: usize,
    view: ViewState,
    selection: Selection,
    renderer: AsciiRenderer,
    output: PathBuf,
    auto_rotate: bool,
    running: bool,
    drag_from: Option<(u16, u16)>,
    dragged: bool,
    status: String,
}

impl TerminalApp {
    pub fn new(models: Vec<Model>, view: ViewState, output: PathBuf) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(models, view, output, width as usize, height as usize))
    }

    pub fn with_size(
        models: Vec<Model>,
        view: ViewState,
        output: PathBuf,
        width: usize,
        height: usize,
    ) -> Self {
        let models = if models.is_empty() {
            vec![Model {
                mesh: Mesh::cube(2.0),
                source: None,
            }]
        } else {
            models
        };
        let selection = Selection::for_mesh(&models[0].mesh);

        Self {
            models,
            active: 0,
            view,
            selection,
            renderer: AsciiRenderer::new(width, height),
            output,
            auto_rotate: false,
            running: true,
            drag_from: None,
            dragged: false,
            status: String::new(),
        }
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn mesh(&self) -> &Mesh {
        &self.models[self.active].mesh
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Display name of a model in the list ("Model 1", "Model 2", ...)
    pub fn model_name(index: usize) -> String {
        format!("Model {}", index + 1)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let tick = Duration::from_millis(AUTO_ROTATE_INTERVAL_MS);
        let mut last_tick = Instant::now();
        let mut dirty = true;

        while self.running {
            if dirty {
                self.render()?;
                dirty = false;
            }

            let timeout = tick.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                let event = event::read()?;
                self.handle_event(event);
                dirty = true;
            }

            if last_tick.elapsed() >= tick {
                last_tick = Instant::now();
                if self.auto_rotate {
                    self.view.auto_rotate();
                    dirty = true;
                }
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.view.rotation.rotate(KEY_ROTATE_STEP, 0.0);
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.view.rotation.rotate(-KEY_ROTATE_STEP, 0.0);
            }
            KeyCode::Char('a') | KeyCode::Left => {
                self.view.rotation.rotate(0.0, -KEY_ROTATE_STEP);
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.view.rotation.rotate(0.0, KEY_ROTATE_STEP);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.view.adjust_scale(ScaleAdjustment::Factor(ZOOM_FACTOR));
            }
            KeyCode::Char('-') => {
                self.view.adjust_scale(ScaleAdjustment::Factor(1.0 / ZOOM_FACTOR));
            }
            KeyCode::Char('r') | KeyCode::Char(' ') => {
                self.auto_rotate = !self.auto_rotate;
            }
            KeyCode::Char('v') => {
                self.selection.mode = SelectionMode::Vertices;
                self.status = "Selecting vertices".to_string();
            }
            KeyCode::Char('f') => {
                self.selection.mode = SelectionMode::Faces;
                self.status = "Selecting faces".to_string();
            }
            KeyCode::Char('c') => {
                let mesh = &self.models[self.active].mesh;
                self.selection.reset(mesh);
            }
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => self.delete_selection(),
            KeyCode::Char('o') => self.save(),
            KeyCode::Tab => self.select_model((self.active + 1) % self.models.len()),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((mouse.column, mouse.row));
                self.dragged = false;
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((col, row)) = self.drag_from {
                    let dx = (f64::from(mouse.column) - f64::from(col)) * CELL_WIDTH;
                    let dy = (f64::from(mouse.row) - f64::from(row)) * CELL_HEIGHT;
                    self.view.drag(dx, dy);
                    self.drag_from = Some((mouse.column, mouse.row));
                    self.dragged = true;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if !self.dragged {
                    self.click(mouse.column, mouse.row);
                }
                self.drag_from = None;
                self.dragged = false;
            }
            MouseEventKind::ScrollDown => self.view.adjust_scale(ScaleAdjustment::wheel(1)),
            MouseEventKind::ScrollUp => self.view.adjust_scale(ScaleAdjustment::wheel(-1)),
            _ => {}
        }
    }

    /// Pick at a terminal cell and toggle the hit element
    pub fn click(&mut self, col: u16, row: u16) -> Option<usize> {
        let point = cell_to_screen(col, row, self.renderer.width(), self.renderer.height());
        let mesh = &self.models[self.active].mesh;
        let picked = self.selection.click(mesh, point, &self.view);
        if picked.is_none() {
            self.status = "Nothing under the pointer".to_string();
        }
        picked
    }

    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            self.status = "Nothing selected".to_string();
            return;
        }
        let mesh = &mut self.models[self.active].mesh;
        let summary = delete_selected(mesh, &mut self.selection);
        info!(
            model = self.active + 1,
            vertices_removed = summary.vertices_removed,
            faces_dropped = summary.faces_dropped,
            faces_removed = summary.faces_removed,
            "Deleted selection"
        );
        self.status = format!(
            "Removed {} vertices, {} faces",
            summary.vertices_removed,
            summary.faces_dropped + summary.faces_removed
        );
    }

    pub fn select_model(&mut self, index: usize) {
        if index >= self.models.len() {
            return;
        }
        self.active = index;
        self.selection.reset(&self.models[index].mesh);
        self.status = Self::model_name(index);
    }

    fn save(&mut self) {
        let mesh = &self.models[self.active].mesh;
        match obj::save(mesh, &self.output) {
            Ok(()) => {
                info!(path = %self.output.display(), "Exported model");
                self.status = format!("Saved {}", self.output.display());
            }
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.status = format!("Error saving model: {e}");
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render mesh
        let model = &self.models[self.active];
        self.renderer
            .render_mesh(&model.mesh, &self.view, &self.selection);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let mode = match self.selection.mode {
            SelectionMode::Vertices => "vertices",
            SelectionMode::Faces => "faces",
        };
        let source = model
            .source
            .as_ref()
            .map_or_else(|| "demo cube".to_string(), |p| p.display().to_string());
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} of {} ({}) | V: {} F: {} | scale {:.0} | select {} | {}",
                Self::model_name(self.active),
                self.models.len(),
                source,
                model.mesh.vertex_count(),
                model.mesh.face_count(),
                self.view.scale(),
                mode,
                self.status
            )),
            cursor::MoveTo(0, self.renderer.height().saturating_sub(1) as u16),
            terminal::Clear(ClearType::CurrentLine),
            Print(
                "Drag/WASD=Rotate Wheel/+-=Zoom R=Auto V/F=Mode Click=Pick X=Delete O=Save Tab=Model Q=Quit"
            ),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};
    use meshview_core::RotationState;

    fn app() -> TerminalApp {
        TerminalApp::with_size(
            Vec::new(),
            ViewState::new(RotationState::zero(), 20.0),
            PathBuf::from("unused.obj"),
            80,
            40,
        )
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_starts_with_demo_cube() {
        let app = app();
        assert_eq!(app.mesh().vertex_count(), 8);
        assert_eq!(TerminalApp::model_name(0), "Model 1");
    }

    #[test]
    fn test_click_selects_and_delete_clears() {
        let mut app = app();
        // Cube vertex 0 (-1, -1, -1) projects to (-25, -25): column 15, row 7
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 15, 7));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 15, 7));
        assert!(app.selection().vertices().contains(&0));

        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));
        assert_eq!(app.mesh().vertex_count(), 7);
        assert_eq!(app.mesh().face_count(), 3);
        assert!(app.selection().is_empty());
    }

    #[test]
    fn test_drag_rotates_instead_of_picking() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 15, 7));
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 25, 7));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 25, 7));

        assert!(app.selection().is_empty());
        assert!((app.view().rotation.y - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_wheel_zoom_is_additive() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::ScrollUp, 0, 0));
        assert_eq!(app.view().scale(), 25.0);
        app.handle_event(mouse(MouseEventKind::ScrollDown, 0, 0));
        app.handle_event(mouse(MouseEventKind::ScrollDown, 0, 0));
        app.handle_event(mouse(MouseEventKind::ScrollDown, 0, 0));
        assert_eq!(app.view().scale(), 10.0);
    }

    #[test]
    fn test_switching_model_clears_selection() {
        let models = vec![
            Model {
                mesh: Mesh::cube(1.0),
                source: None,
            },
            Model {
                mesh: Mesh::cube(3.0),
                source: None,
            },
        ];
        let mut app = TerminalApp::with_size(models, ViewState::default(), PathBuf::new(), 80, 40);
        app.selection.toggle_vertex(3);

        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert!(app.selection().is_empty());
        assert!((app.mesh().vertices()[0].x + 1.5).abs() < 1e-12);
    }
}
