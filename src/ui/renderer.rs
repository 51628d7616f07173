/// Terminal renderer: draws a `Snapshot` with a diffing double buffer.
///
///   1. Compose the frame into `front`
///   2. Emit only the cells that differ from `back` (the previous frame)
///   3. Flush once, swap buffers
///
/// One world cell (TILE_SIZE units square) is two terminal columns wide.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use girder_run::domain::platform::Slope;
use girder_run::domain::rules::StateTag;
use girder_run::domain::tile::TILE_SIZE;
use girder_run::sim::leaderboard::LeaderboardEntry;
use girder_run::sim::snapshot::{Phase, RenderItem, RenderKind, Snapshot};

const BASE_BG: Color = Color::Rgb { r: 14, g: 12, b: 24 };
const HUD_BG: Color = Color::Rgb { r: 60, g: 16, b: 24 };
const BOX_BG: Color = Color::Rgb { r: 36, g: 36, b: 44 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 60 };
const GIRDER: Color = Color::Rgb { r: 230, g: 60, b: 90 };

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };
    /// Never equal to a composed cell; forces a repaint.
    const STALE: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new() -> Self {
        FrameBuffer { width: 0, height: 0, cells: Vec::new() }
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.width = w;
        self.height = h;
        self.cells = vec![Cell::BLANK; w * h];
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    fn fill_box(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

/// Glyph pair and colour for one world cell of an item.
fn glyph(kind: RenderKind, blink: bool) -> ([char; 2], Color) {
    match kind {
        RenderKind::Character { state, facing_right } => {
            let body = match state {
                StateTag::Normal => if facing_right { ['o', '>'] } else { ['<', 'o'] },
                StateTag::Climbing => ['}', '{'],
                StateTag::PoweredUp => if facing_right { ['O', 'T'] } else { ['T', 'O'] },
                StateTag::Dead => ['x', 'x'],
            };
            let fg = match state {
                StateTag::PoweredUp if blink => Color::White,
                StateTag::PoweredUp => GOLD,
                StateTag::Dead => Color::DarkGrey,
                _ => Color::Rgb { r: 90, g: 200, b: 255 },
            };
            (body, fg)
        }
        RenderKind::Girder { slope: Slope::Flat } => (['=', '='], GIRDER),
        RenderKind::Girder { slope: Slope::Left } => (['<', '='], GIRDER),
        RenderKind::Girder { slope: Slope::Right } => (['=', '>'], GIRDER),
        RenderKind::Rivet => (['[', ']'], Color::Rgb { r: 250, g: 220, b: 120 }),
        RenderKind::Elevator => (['#', '#'], Color::Rgb { r: 160, g: 160, b: 170 }),
        RenderKind::Ladder => (['|', '|'], Color::Rgb { r: 80, g: 220, b: 220 }),
        RenderKind::Barrel => (['(', ')'], Color::Rgb { r: 200, g: 120, b: 50 }),
        RenderKind::Fire => (['*', '*'], if blink { Color::Yellow } else { Color::Red }),
        RenderKind::Hammer => (['T', ' '], Color::White),
        RenderKind::Bonus => (['$', ' '], GOLD),
        RenderKind::Goal => (['<', '3'], Color::Rgb { r: 255, g: 120, b: 200 }),
        RenderKind::Kong => (['K', 'K'], Color::Rgb { r: 170, g: 90, b: 40 }),
    }
}

/// Cells an item covers. Actors take the single cell under their centre so
/// they never smear across two.
fn cells_of(item: &RenderItem) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
    let to_cell = |v: f32| (v / TILE_SIZE).floor().max(0.0) as usize;
    if item.kind.is_actor() {
        let cx = to_cell(item.position.x + item.size.w() / 2.0);
        let cy = to_cell(item.position.y + item.size.h() / 2.0);
        return (cx..cx + 1, cy..cy + 1);
    }
    let x0 = to_cell(item.position.x);
    let y0 = to_cell(item.position.y);
    let x1 = to_cell(item.position.x + item.size.w() - 0.01).max(x0);
    let y1 = to_cell(item.position.y + item.size.h() - 0.01).max(y0);
    (x0..x1 + 1, y0..y1 + 1)
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_phase: Option<Phase>,
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(),
            back: FrameBuffer::new(),
            last_phase: None,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Resize both buffers to the terminal and invalidate the back one.
    fn fit_terminal(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.fill(Cell::STALE);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, snap: &Snapshot, board: &[LeaderboardEntry]) -> io::Result<()> {
        self.fit_terminal()?;
        if self.last_phase != Some(snap.hud.phase) {
            self.invalidate()?;
            self.last_phase = Some(snap.hud.phase);
        }
        self.frame = self.frame.wrapping_add(1);

        self.front.fill(Cell::BLANK);
        match snap.hud.phase {
            Phase::Title => self.compose_title(board),
            Phase::Playing => self.compose_game(snap),
            Phase::Paused => {
                self.compose_game(snap);
                self.compose_pause();
            }
            Phase::GameOver => {
                self.compose_game(snap);
                self.compose_game_over(snap, board);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut fg = Color::White;
        let mut bg = BASE_BG;
        queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;

        for y in 0..self.front.height {
            let mut cursor_here = false;
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    cursor_here = false;
                    continue;
                }
                if !cursor_here {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != fg {
                    fg = cell.fg;
                    queue!(self.writer, SetForegroundColor(fg))?;
                }
                if cell.bg != bg {
                    bg = cell.bg;
                    queue!(self.writer, SetBackgroundColor(bg))?;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_here = true;
            }
        }
        self.writer.flush()
    }

    // ── Compose ──

    fn compose_game(&mut self, snap: &Snapshot) {
        let hud = &snap.hud;
        let power = hud
            .power_remaining
            .map(|t| format!("  HAMMER {t:>4.1}s"))
            .unwrap_or_default();
        let line = format!(
            " L{} {:<14} SCORE {:<7} BONUS {:<5} LIVES {}{}",
            hud.level, hud.level_name, hud.score, hud.bonus, hud.lives, power,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);

        let cols = (snap.world_width / TILE_SIZE).ceil() as usize;
        let rows = (snap.world_height / TILE_SIZE).ceil() as usize;
        let blink = (self.frame / 8) % 2 == 0;

        // Scenery first so actors stay visible on ladders and girders.
        let (actors, scenery): (Vec<&RenderItem>, Vec<&RenderItem>) =
            snap.items.iter().partition(|i| i.kind.is_actor());
        for item in scenery.into_iter().chain(actors) {
            let ([left, right], fg) = glyph(item.kind, blink);
            let (xs, ys) = cells_of(item);
            for gy in ys.filter(|&gy| gy < rows) {
                for gx in xs.clone().filter(|&gx| gx < cols) {
                    let (col, row) = (gx * CELL_W, MAP_ROW + gy);
                    self.front.set(col, row, Cell::new(left, fg, BASE_BG));
                    self.front.set(col + 1, row, Cell::new(right, fg, BASE_BG));
                }
            }
        }

        let help_row = MAP_ROW + rows + 1;
        self.front.put_str(
            0,
            help_row,
            " ←→/AD Move  ↑↓/WS Climb  SPACE/Z Jump  ESC Pause",
            Color::DarkGrey,
            BASE_BG,
        );
    }

    fn compose_title(&mut self, board: &[LeaderboardEntry]) {
        let art = [
            r"   ___  _         _            ___           ",
            r"  / __|(_) _ _ __| | ___  _ _ | _ \ _  _  _ _  ",
            r" | (_ || || '_/ _` |/ -_)| '_||   /| || || ' \ ",
            r"  \___||_||_| \__,_|\___||_|  |_|_\ \_,_||_||_|",
        ];
        for (i, line) in art.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, BASE_BG);
        }
        self.front.put_str(8, 8, "Climb. Dodge the barrels. Reach the top.", GIRDER, BASE_BG);

        let hi = Color::Rgb { r: 80, g: 255, b: 120 };
        self.front.put_str(8, 11, "ENTER   Start", hi, BASE_BG);
        self.front.put_str(8, 12, "  Q     Quit", Color::White, BASE_BG);

        let help = [
            "Controls",
            "  ←→ / AD     Walk        SPACE / Z  Jump",
            "  ↑↓ / WS     Climb       ESC        Pause",
            "  Pad: D-pad / stick, A jump, START, SELECT",
        ];
        for (i, line) in help.iter().enumerate() {
            let fg = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(8, 15 + i, line, fg, BASE_BG);
        }
        self.compose_board(8, 21, board);
    }

    fn compose_board(&mut self, x: usize, y: usize, board: &[LeaderboardEntry]) {
        if board.is_empty() {
            return;
        }
        self.front.put_str(x, y, "High Scores", GOLD, BASE_BG);
        for (i, e) in board.iter().enumerate() {
            let line = format!("{:>2}. {:<12} {:>7}  L{}", i + 1, e.name, e.score, e.level);
            self.front.put_str(x + 2, y + 1 + i, &line, Color::White, BASE_BG);
        }
    }

    fn compose_pause(&mut self) {
        let (x, y) = (10, MAP_ROW + 2);
        self.front.fill_box(x, y, 30, 6, BOX_BG);
        let label = if (self.frame / 16) % 2 == 0 { ">> PAUSED <<" } else { "   PAUSED   " };
        self.front.put_str(x + 9, y + 1, label, GOLD, BOX_BG);
        self.front.put_str(x + 3, y + 3, "ENTER / ESC  Resume", Color::White, BOX_BG);
        self.front.put_str(x + 3, y + 4, "Q            Title", Color::White, BOX_BG);
    }

    fn compose_game_over(&mut self, snap: &Snapshot, board: &[LeaderboardEntry]) {
        let (x, y) = (6, MAP_ROW + 1);
        let h = 7 + board.len().min(10) + usize::from(!board.is_empty());
        self.front.fill_box(x, y, 40, h, BOX_BG);
        self.front.put_str(x + 14, y + 1, "GAME  OVER", Color::Rgb { r: 255, g: 70, b: 70 }, BOX_BG);
        let score = format!("Final score  {}", snap.hud.score);
        self.front.put_str(x + 4, y + 3, &score, Color::White, BOX_BG);
        self.front.put_str(x + 4, y + 4, "ENTER  Back to title", Color::Rgb { r: 80, g: 255, b: 120 }, BOX_BG);
        if !board.is_empty() {
            self.front.put_str(x + 4, y + 6, "High Scores", GOLD, BOX_BG);
            for (i, e) in board.iter().take(10).enumerate() {
                let line = format!("{:>2}. {:<12} {:>7}", i + 1, e.name, e.score);
                self.front.put_str(x + 6, y + 7 + i, &line, Color::White, BOX_BG);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder_run::domain::geometry::{BoundingBox, Position};

    fn item(x: f32, y: f32, w: u32, h: u32, kind: RenderKind) -> RenderItem {
        RenderItem { id: 1, position: Position::new(x, y), size: BoundingBox::new(w, h), kind }
    }

    #[test]
    fn scenery_covers_its_span() {
        let ladder = item(16.0, 0.0, 16, 48, RenderKind::Ladder);
        assert_eq!(cells_of(&ladder), (1..2, 0..3));
    }

    #[test]
    fn actors_take_one_cell() {
        let barrel = item(10.0, 20.0, 12, 12, RenderKind::Barrel);
        assert_eq!(cells_of(&barrel), (1..2, 1..2));
    }
}
