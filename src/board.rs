use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent, Stylize},
    QueueableCommand,
};
use serde::Serialize;

use std::fmt;
use std::io::{stdout, Write};

use crate::error::{Connect4Error, Result};
use crate::{HEIGHT, WIDTH};

mod static_masks {
    use crate::{HEIGHT, WIDTH};

    pub const fn bottom_mask() -> u64 {
        let mut mask = 0;
        let mut column = 0;
        while column < WIDTH {
            mask |= 1 << (column * (HEIGHT + 1));
            column += 1;
        }
        mask
    }
    pub const fn full_board_mask() -> u64 {
        bottom_mask() * ((1 << HEIGHT as u64) - 1)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// The symbol used for this player's discs in text output
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }

    fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1 (X)"),
            Player::Two => write!(f, "Player 2 (O)"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn player(&self) -> Option<Player> {
        match self {
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
            Cell::Empty => None,
        }
    }

    fn symbol(&self) -> char {
        self.player().map_or('.', Player::symbol)
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameResult {
    Ongoing,
    Win(Player),
    Draw,
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameResult::Ongoing)
    }
}

/// A fixed-capacity list of playable columns, in ascending column order
#[derive(Copy, Clone, Debug)]
pub struct MoveList {
    moves: [usize; WIDTH],
    size: usize,
    next: usize,
}

impl MoveList {
    fn new() -> Self {
        Self {
            moves: [0; WIDTH],
            size: 0,
            next: 0,
        }
    }

    fn push(&mut self, column: usize) {
        self.moves[self.size] = column;
        self.size += 1;
    }

    /// All the columns in the list, including any already yielded by the iterator
    pub fn as_slice(&self) -> &[usize] {
        &self.moves[..self.size]
    }
}

impl Iterator for MoveList {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.size {
            self.next += 1;
            Some(self.moves[self.next - 1])
        } else {
            None
        }
    }
}

/// A Connect 4 position
///
/// Cells are kept as a plain grid for evaluation and display, alongside one
/// bitmask per player for constant-time alignment tests. Each column of a mask
/// uses `HEIGHT + 1` bits, the extra bit keeping alignments from wrapping
/// between columns.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Board {
    cells: [Cell; WIDTH * HEIGHT], // cells are stored left-to-right, bottom-to-top
    heights: [usize; WIDTH],
    masks: [u64; 2],
    num_moves: usize,
    to_move: Player,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; WIDTH * HEIGHT],
            heights: [0; WIDTH],
            masks: [0; 2],
            num_moves: 0,
            to_move: Player::One,
        }
    }

    /// Builds a position from a string of 0-indexed column digits, player one moving first
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10) {
                Some(column) => {
                    board.play_checked(column as usize)?;
                }
                None => return Err(Connect4Error::Parse(column_char)),
            }
        }
        Ok(board)
    }

    pub fn cell(&self, column: usize, row: usize) -> Cell {
        self.cells[column + WIDTH * row]
    }

    pub fn height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn is_full(&self) -> bool {
        self.num_moves == WIDTH * HEIGHT
    }

    pub fn playable(&self, column: usize) -> bool {
        column < WIDTH && self.heights[column] < HEIGHT
    }

    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        for column in 0..WIDTH {
            if self.playable(column) {
                moves.push(column);
            }
        }
        moves
    }

    /// Returns a copy of the board with `player`'s disc dropped in `column`
    ///
    /// `player` moves regardless of whose turn it was, and their opponent is to move afterwards.
    pub fn apply(&self, column: usize, player: Player) -> Result<Board> {
        self.check_move(column)?;
        let mut next = *self;
        next.place(column, player);
        next.to_move = player.other();
        Ok(next)
    }

    /// Plays a move for the player to move, validating it first
    pub fn play_checked(&mut self, column: usize) -> Result<GameResult> {
        self.check_move(column)?;
        self.play(column);
        Ok(self.game_result())
    }

    fn check_move(&self, column: usize) -> Result<()> {
        if column >= WIDTH {
            return Err(Connect4Error::IllegalMove {
                column,
                reason: "column out of range",
            });
        }
        if !self.playable(column) {
            return Err(Connect4Error::IllegalMove {
                column,
                reason: "column is full",
            });
        }
        if self.game_result().is_over() {
            return Err(Connect4Error::IllegalMove {
                column,
                reason: "game is already over",
            });
        }
        Ok(())
    }

    /// Plays a move for the player to move, assuming the column is playable
    pub fn play(&mut self, column: usize) {
        let player = self.to_move;
        self.place(column, player);
        self.to_move = player.other();
    }

    /// Takes back the top disc of `column`, handing the turn back to its owner
    pub fn undo(&mut self, column: usize) {
        debug_assert!(self.heights[column] > 0, "undo on empty column {}", column);
        self.heights[column] -= 1;
        let index = column + WIDTH * self.heights[column];
        if let Some(player) = self.cells[index].player() {
            self.masks[player.index()] &= !Self::cell_mask(column, self.heights[column]);
            self.to_move = player;
        }
        self.cells[index] = Cell::Empty;
        self.num_moves -= 1;
    }

    fn place(&mut self, column: usize, player: Player) {
        let row = self.heights[column];
        self.cells[column + WIDTH * row] = player.into();
        self.masks[player.index()] |= Self::cell_mask(column, row);
        self.heights[column] += 1;
        self.num_moves += 1;
    }

    fn cell_mask(column: usize, row: usize) -> u64 {
        1 << (column * (HEIGHT + 1) + row)
    }

    pub fn game_result(&self) -> GameResult {
        // the player who moved last is the only one who can have just won
        let last = self.to_move.other();
        if Self::has_alignment(self.masks[last.index()]) {
            GameResult::Win(last)
        } else if Self::has_alignment(self.masks[self.to_move.index()]) {
            GameResult::Win(self.to_move)
        } else if self.is_full() {
            GameResult::Draw
        } else {
            GameResult::Ongoing
        }
    }

    fn has_alignment(pos: u64) -> bool {
        // check horizontal alignment
        // mark all horizontal runs of 2
        let mut m = pos & (pos >> (HEIGHT + 1));
        // check for runs of 2 * (runs of 2)
        if m & (m >> (2 * (HEIGHT + 1))) != 0 {
            return true;
        }

        // check diagonal alignment 1
        m = pos & (pos >> HEIGHT);
        if m & (m >> (2 * HEIGHT)) != 0 {
            return true;
        }

        // check diagonal alignment 2
        m = pos & (pos >> (HEIGHT + 2));
        if m & (m >> (2 * (HEIGHT + 2))) != 0 {
            return true;
        }

        // check vertical alignment
        m = pos & (pos >> 1);
        m & (m >> 2) != 0
    }

    /// A key identifying the position, used to match nodes between search traces
    pub fn digest(&self) -> u64 {
        let board_mask = self.masks[0] | self.masks[1];
        debug_assert_eq!(board_mask & !static_masks::full_board_mask(), 0);
        let key = self.masks[Player::One.index()] + board_mask;
        match self.to_move {
            Player::One => key,
            Player::Two => key | 1 << 63,
        }
    }

    pub fn to_ascii(&self) -> String {
        self.to_string()
    }

    /// Draws the board to the terminal in colour
    pub fn display(&self) -> std::io::Result<()> {
        let mut stdout = stdout();

        let cols: String = (0..WIDTH).map(|x| x.to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;
        for _ in 0..HEIGHT {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for (idx, cell) in self.cells.iter().enumerate() {
            let (pos_x, pos_y) = (
                origin_x + (idx % WIDTH) as u16,
                origin_y.saturating_sub(1 + (idx / WIDTH) as u16),
            );

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match cell {
                            Cell::PlayerOne => Color::Red,
                            Cell::PlayerTwo => Color::Yellow,
                            Cell::Empty => Color::DarkBlue,
                        }),
                ))?;
        }
        stdout
            .queue(MoveTo(origin_x, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header: Vec<String> = (0..WIDTH).map(|c| c.to_string()).collect();
        write!(f, "{}", header.join(" "))?;
        for row in (0..HEIGHT).rev() {
            let line: Vec<String> = (0..WIDTH)
                .map(|column| self.cell(column, row).symbol().to_string())
                .collect();
            write!(f, "\n{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for column in 0..WIDTH {
            for row in 0..HEIGHT {
                assert_eq!(board.cell(column, row), Cell::Empty);
            }
        }
        assert_eq!(board.to_move(), Player::One);
        assert_eq!(board.game_result(), GameResult::Ongoing);
        assert_eq!(board.legal_moves().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_discs_stack_from_the_bottom() {
        let board = Board::from_moves("33").unwrap();
        assert_eq!(board.cell(3, 0), Cell::PlayerOne);
        assert_eq!(board.cell(3, 1), Cell::PlayerTwo);
        assert_eq!(board.height(3), 2);
        assert_eq!(board.to_move(), Player::One);
    }

    #[test]
    fn test_apply_does_not_touch_original() {
        let board = Board::new();
        let next = board.apply(2, Player::Two).unwrap();
        assert_eq!(board.num_moves(), 0);
        assert_eq!(next.cell(2, 0), Cell::PlayerTwo);
        assert_eq!(next.to_move(), Player::One);
    }

    #[test]
    fn test_full_column_is_illegal() {
        let mut board = Board::from_moves("000000").unwrap();
        assert!(!board.playable(0));
        assert!(matches!(
            board.play_checked(0),
            Err(Connect4Error::IllegalMove { column: 0, .. })
        ));
        assert_eq!(board.legal_moves().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_out_of_range_column_is_illegal() {
        let board = Board::new();
        assert!(matches!(
            board.apply(WIDTH, Player::One),
            Err(Connect4Error::IllegalMove { column: WIDTH, .. })
        ));
        assert!(matches!(
            Board::from_moves("37"),
            Err(Connect4Error::IllegalMove { column: 7, .. })
        ));
        assert!(matches!(Board::from_moves("3a"), Err(Connect4Error::Parse('a'))));
    }

    #[test]
    fn test_undo_restores_position() {
        let original = Board::from_moves("3342").unwrap();
        let mut board = original;
        for column in original.legal_moves() {
            board.play(column);
            assert_ne!(board, original);
            board.undo(column);
            assert_eq!(board, original);
        }
    }

    #[test]
    fn test_horizontal_win() {
        let board = Board::from_moves("0011223").unwrap();
        assert_eq!(board.game_result(), GameResult::Win(Player::One));
    }

    #[test]
    fn test_vertical_win() {
        let board = Board::from_moves("0102030").unwrap();
        assert_eq!(board.game_result(), GameResult::Win(Player::One));
    }

    #[test]
    fn test_diagonal_up_win() {
        // X on (0,0) (1,1) (2,2) (3,3)
        let board = Board::from_moves("01122323363").unwrap();
        assert_eq!(board.cell(3, 3), Cell::PlayerOne);
        assert_eq!(board.game_result(), GameResult::Win(Player::One));
    }

    #[test]
    fn test_diagonal_down_win() {
        // X on (6,0) (5,1) (4,2) (3,3)
        let board = Board::from_moves("65544343303").unwrap();
        assert_eq!(board.cell(3, 3), Cell::PlayerOne);
        assert_eq!(board.game_result(), GameResult::Win(Player::One));
    }

    #[test]
    fn test_no_win_across_column_boundary() {
        // X holds the top three cells of column 0 and the bottom cell of column 1
        let board = Board::from_moves("10205006060").unwrap();
        assert_eq!(board.cell(0, HEIGHT - 1), Cell::PlayerOne);
        assert_eq!(board.cell(1, 0), Cell::PlayerOne);
        assert_eq!(board.game_result(), GameResult::Ongoing);
    }

    #[test]
    fn test_moves_after_win_are_rejected() {
        let mut board = Board::from_moves("0011223").unwrap();
        assert!(matches!(
            board.play_checked(4),
            Err(Connect4Error::IllegalMove { column: 4, .. })
        ));
    }

    #[test]
    fn test_full_board_is_draw() {
        let board = Board::from_moves(crate::test::DRAWN_GAME).unwrap();
        assert!(board.is_full());
        assert_eq!(board.game_result(), GameResult::Draw);
        assert_eq!(board.legal_moves().count(), 0);
    }

    #[test]
    fn test_digest_distinguishes_positions() {
        let a = Board::from_moves("34").unwrap();
        let b = Board::from_moves("43").unwrap();
        let c = Board::from_moves("3").unwrap().apply(4, Player::Two).unwrap();
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), c.digest());
        assert_ne!(Board::new().digest(), Board::from_moves("0").unwrap().digest());
    }

    #[test]
    fn test_ascii_rendering() {
        let board = Board::from_moves("34").unwrap();
        let text = board.to_ascii();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), HEIGHT + 1);
        assert_eq!(lines[0], "0 1 2 3 4 5 6");
        assert_eq!(lines[HEIGHT], ". . . X O . .");
        assert_eq!(lines[1], ". . . . . . .");
    }
}
