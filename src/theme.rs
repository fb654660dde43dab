pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        pub const SURFACE2: Color = Color::Rgb(108, 112, 134);  // Subtle dim

        // Accents
        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const GREEN: Color = Color::Rgb(166, 227, 161);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
        pub const MAUVE: Color = Color::Rgb(203, 166, 247);
        pub const PEACH: Color = Color::Rgb(250, 179, 135);
        pub const TEAL: Color = Color::Rgb(148, 226, 213);
        pub const SKY: Color = Color::Rgb(137, 220, 235);
    }
}

use nu_ansi_term::Style;

use crate::config::Colors;

/// Groups of instructions that share a highlight colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionClass {
    Facing,
    Memory,
    Increment,
    Decrement,
    Output,
    Input,
    Loop,
    Halt,
    Other,
}

impl InstructionClass {
    pub fn of(ch: char) -> Self {
        match ch {
            '>' | '<' | 'v' | '^' => InstructionClass::Facing,
            'd' | 'a' | 's' | 'w' => InstructionClass::Memory,
            '+' => InstructionClass::Increment,
            '-' => InstructionClass::Decrement,
            '.' => InstructionClass::Output,
            ',' => InstructionClass::Input,
            '[' | ']' => InstructionClass::Loop,
            '!' => InstructionClass::Halt,
            _ => InstructionClass::Other,
        }
    }

    pub fn style(self, colors: &Colors) -> Style {
        let color = match self {
            InstructionClass::Facing => colors.op_facing,
            InstructionClass::Memory => colors.op_memory,
            InstructionClass::Increment => colors.op_inc,
            InstructionClass::Decrement => colors.op_dec,
            InstructionClass::Output => colors.op_output,
            InstructionClass::Input => colors.op_input,
            InstructionClass::Loop => colors.op_bracket,
            InstructionClass::Halt => colors.op_halt,
            InstructionClass::Other => colors.non_op,
        };
        Style::new().fg(color).bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_instruction() {
        assert_eq!(InstructionClass::of('v'), InstructionClass::Facing);
        assert_eq!(InstructionClass::of('w'), InstructionClass::Memory);
        assert_eq!(InstructionClass::of(']'), InstructionClass::Loop);
        assert_eq!(InstructionClass::of('!'), InstructionClass::Halt);
        assert_eq!(InstructionClass::of('V'), InstructionClass::Other);
        assert_eq!(InstructionClass::of(' '), InstructionClass::Other);
    }
}
