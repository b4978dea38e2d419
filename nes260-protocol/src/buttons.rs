//! NES controller button state
//!
//! Each controller is one byte, in the order the NES shift register
//! reports them: A, B, Select, Start, Up, Down, Left, Right.

use core::fmt;

/// A single controller button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    /// All buttons in bit order
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    /// Bit mask of this button within a controller byte
    pub fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Lower-case name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Button::A => "a",
            Button::B => "b",
            Button::Select => "select",
            Button::Start => "start",
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
        }
    }

    /// Parse a button name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("sel") {
            return Some(Button::Select);
        }
        Self::ALL
            .into_iter()
            .find(|button| button.name().eq_ignore_ascii_case(name))
    }
}

/// Error returned by [`Buttons::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonParseError {
    /// A name that is not a button
    UnknownButton,
    /// A `0x` value that is not a valid byte
    InvalidHex,
}

impl fmt::Display for ButtonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonParseError::UnknownButton => f.write_str("unknown button name"),
            ButtonParseError::InvalidHex => f.write_str("invalid hex button byte"),
        }
    }
}

/// Pressed buttons of one controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(u8);

impl Buttons {
    /// No buttons pressed
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from a raw controller byte
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw controller byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.mask();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.mask();
    }

    /// Builder-style insert
    pub fn with(mut self, button: Button) -> Self {
        self.insert(button);
        self
    }

    /// Pressed buttons in bit order
    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL
            .into_iter()
            .filter(move |button| self.contains(*button))
    }

    /// Parse a controller state from text
    ///
    /// Accepts `none`, a `0x`-prefixed byte, or button names separated by
    /// `,` or `+` (e.g. `a+start`, `up,left`).
    pub fn parse(text: &str) -> Result<Self, ButtonParseError> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Ok(Self::empty());
        }
        if let Some(hex) = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
        {
            return u8::from_str_radix(hex, 16)
                .map(Self::from_bits)
                .map_err(|_| ButtonParseError::InvalidHex);
        }

        let mut buttons = Self::empty();
        for name in text.split([',', '+']) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let button = Button::from_name(name).ok_or(ButtonParseError::UnknownButton)?;
            buttons.insert(button);
        }
        Ok(buttons)
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, button) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(button.name())?;
        }
        Ok(())
    }
}

/// Both controllers, as carried by a button update command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonPair {
    pub player1: Buttons,
    pub player2: Buttons,
}

impl ButtonPair {
    pub fn new(player1: Buttons, player2: Buttons) -> Self {
        Self { player1, player2 }
    }

    /// The two body bytes of a button update command
    pub fn to_wire(self) -> [u8; 2] {
        [self.player1.bits(), self.player2.bits()]
    }

    pub fn from_wire(bytes: [u8; 2]) -> Self {
        Self {
            player1: Buttons::from_bits(bytes[0]),
            player2: Buttons::from_bits(bytes[1]),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ButtonParseError {}
