/*
 * Load progress display: a bar along the bottom attribute row and a
 * kilobyte counter drawn as chunky digits in the top-left attribute
 * cells. Everything here is attribute traffic; the bitmap is untouched.
 * The loaded snapshot's own attributes overwrite all of it when the
 * runtime region is restored at switch time.
 */
use crate::memory::{attr, HostMemory, ATTRIBUTES_BASE, ATTRIBUTE_COLUMNS, BLACK, WHITE};

const BAR_ROW: u16 = 23;
const BAR_BASE: u16 = ATTRIBUTES_BASE + BAR_ROW * ATTRIBUTE_COLUMNS;

// 3x5 cell digits, right-aligned in columns 20..31.
const COUNTER_COL: u16 = 20;
const DIGIT_ROWS: usize = 5;

const DIGITS: [[u8; DIGIT_ROWS]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

pub struct Progress {
    expected: u16,
    cells: u16,
}

impl Progress {
    pub const fn new() -> Self {
        Self {
            expected: 0,
            cells: 0,
        }
    }

    /// Total kilobytes the current snapshot will deliver. Ticks arriving
    /// before this is set are ignored.
    pub fn set_expected(&mut self, kilobytes: u16) {
        self.expected = kilobytes;
        self.cells = 0;
    }

    /// Update the display for the given kilobyte count. Only newly covered
    /// bar cells are painted, so a tick costs a handful of stores.
    pub fn tick<M: HostMemory>(&mut self, mem: &mut M, kilobytes_now: u16) {
        if self.expected == 0 {
            return;
        }
        self.paint_counter(mem, kilobytes_now.min(999));

        let full = ATTRIBUTE_COLUMNS as u32;
        let cells = ((kilobytes_now as u32 * full) / self.expected as u32).min(full) as u16;
        while self.cells < cells {
            mem.write(BAR_BASE + self.cells, attr(WHITE, WHITE));
            self.cells += 1;
        }
    }

    fn paint_counter<M: HostMemory>(&self, mem: &mut M, value: u16) {
        let digits = [value / 100 % 10, value / 10 % 10, value % 10];
        for (slot, &digit) in digits.iter().enumerate() {
            let blank = (slot == 0 && value < 100) || (slot == 1 && value < 10);
            let col = COUNTER_COL + slot as u16 * 4;
            for row in 0..DIGIT_ROWS {
                let bits = DIGITS[digit as usize][row];
                for c in 0u16..3 {
                    let on = !blank && bits & (0b100 >> c) != 0;
                    let cell = if on {
                        attr(BLACK, WHITE)
                    } else {
                        attr(WHITE, BLACK)
                    };
                    mem.write(
                        ATTRIBUTES_BASE + row as u16 * ATTRIBUTE_COLUMNS + col + c,
                        cell,
                    );
                }
            }
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}
