use ratatui::style::Color;

use crate::calendar::EventType;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub title: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub today: Color,
    pub weekday_header: Color,
    pub sunday: Color,
    pub completed: Color,
    pub in_progress: Color,
    pub inactive_day: Color,
    pub status_bar: Color,
    pub help_title: Color,
    pub help_section: Color,
    pub error: Color,
    pub success: Color,
    pub wedding: Color,
    pub funeral: Color,
    pub opening: Color,
    pub other: Color,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            title: Color::Cyan,
            selected_bg: Color::Blue,
            selected_fg: Color::White,
            today: Color::Yellow,
            weekday_header: Color::Gray,
            sunday: Color::Red,
            completed: Color::Green,
            in_progress: Color::Rgb(255, 165, 0),
            inactive_day: Color::DarkGray,
            status_bar: Color::White,
            help_title: Color::Cyan,
            help_section: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            wedding: Color::LightMagenta,
            funeral: Color::Gray,
            opening: Color::LightBlue,
            other: Color::Magenta,
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            title: Color::Rgb(136, 192, 208),
            selected_bg: Color::Rgb(59, 66, 82),
            selected_fg: Color::Rgb(236, 239, 244),
            today: Color::Rgb(235, 203, 139),
            weekday_header: Color::Rgb(216, 222, 233),
            sunday: Color::Rgb(191, 97, 106),
            completed: Color::Rgb(163, 190, 140),
            in_progress: Color::Rgb(208, 135, 112),
            inactive_day: Color::Rgb(76, 86, 106),
            status_bar: Color::Rgb(216, 222, 233),
            help_title: Color::Rgb(136, 192, 208),
            help_section: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
            success: Color::Rgb(163, 190, 140),
            wedding: Color::Rgb(180, 142, 173),
            funeral: Color::Rgb(129, 161, 193),
            opening: Color::Rgb(94, 129, 172),
            other: Color::Rgb(143, 188, 187),
        }
    }

    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            title: Color::Rgb(139, 233, 253),
            selected_bg: Color::Rgb(68, 71, 90),
            selected_fg: Color::Rgb(248, 248, 242),
            today: Color::Rgb(241, 250, 140),
            weekday_header: Color::Rgb(248, 248, 242),
            sunday: Color::Rgb(255, 85, 85),
            completed: Color::Rgb(80, 250, 123),
            in_progress: Color::Rgb(255, 184, 108),
            inactive_day: Color::Rgb(98, 114, 164),
            status_bar: Color::Rgb(248, 248, 242),
            help_title: Color::Rgb(139, 233, 253),
            help_section: Color::Rgb(241, 250, 140),
            error: Color::Rgb(255, 85, 85),
            success: Color::Rgb(80, 250, 123),
            wedding: Color::Rgb(255, 121, 198),
            funeral: Color::Rgb(98, 114, 164),
            opening: Color::Rgb(139, 233, 253),
            other: Color::Rgb(189, 147, 249),
        }
    }

    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            title: Color::Rgb(251, 184, 108),
            selected_bg: Color::Rgb(60, 56, 54),
            selected_fg: Color::Rgb(235, 219, 178),
            today: Color::Rgb(250, 189, 47),
            weekday_header: Color::Rgb(235, 219, 178),
            sunday: Color::Rgb(251, 73, 52),
            completed: Color::Rgb(184, 187, 38),
            in_progress: Color::Rgb(254, 128, 25),
            inactive_day: Color::Rgb(146, 131, 116),
            status_bar: Color::Rgb(235, 219, 178),
            help_title: Color::Rgb(251, 184, 108),
            help_section: Color::Rgb(254, 128, 25),
            error: Color::Rgb(251, 73, 52),
            success: Color::Rgb(184, 187, 38),
            wedding: Color::Rgb(211, 134, 155),
            funeral: Color::Rgb(168, 153, 132),
            opening: Color::Rgb(131, 165, 152),
            other: Color::Rgb(177, 98, 134),
        }
    }

    pub fn get_by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::default_theme(),
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "nord", "dracula", "gruvbox"]
    }

    /// Badge color of an event type.
    pub fn badge(&self, event_type: EventType) -> Color {
        match event_type {
            EventType::Wedding => self.wedding,
            EventType::Funeral => self.funeral,
            EventType::Opening => self.opening,
            EventType::Other => self.other,
        }
    }

    pub fn dot(&self, completed: bool) -> Color {
        if completed { self.completed } else { self.in_progress }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}
