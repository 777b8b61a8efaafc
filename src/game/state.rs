/// Axis-aligned bounding box in screen units (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rect from its centre point
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Strict overlap test; rects that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// The player-controlled bird
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub rect: Rect,
    /// Vertical velocity in units per tick (positive is downwards)
    pub velocity: f32,
}

impl Bird {
    pub fn new(center_x: f32, center_y: f32, size: f32) -> Self {
        Self {
            rect: Rect::from_center(center_x, center_y, size, size),
            velocity: 0.0,
        }
    }

    /// Replace the current velocity with the flap impulse
    pub fn flap(&mut self, strength: f32) {
        self.velocity = strength;
    }

    /// Accelerate by gravity and integrate the position one tick
    pub fn apply_gravity(&mut self, gravity: f32) {
        self.velocity += gravity;
        self.rect.top += self.velocity;
        self.clamp_to_ceiling();
    }

    /// Keep the bird on screen at the top, stopping it there
    pub fn clamp_to_ceiling(&mut self) {
        if self.rect.top < 0.0 {
            self.rect.top = 0.0;
            self.velocity = 0.0;
        }
    }
}

/// A food item drifting towards the bird
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub rect: Rect,
}

impl Food {
    pub fn new(left: f32, top: f32, size: f32) -> Self {
        Self {
            rect: Rect::new(left, top, size, size),
        }
    }

    pub fn advance(&mut self, speed: f32) {
        self.rect.left -= speed;
    }

    /// True once the item is completely past the left edge
    pub fn has_exited(&self) -> bool {
        self.rect.right() < 0.0
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub bird: Bird,
    /// Live food items in spawn order
    pub foods: Vec<Food>,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Food items collected this episode
    pub score: u32,
    /// Ticks simulated this episode
    pub steps: u32,
    pub done: bool,
}

impl GameState {
    pub fn new(bird: Bird, screen_width: f32, screen_height: f32) -> Self {
        Self {
            bird,
            foods: Vec::new(),
            screen_width,
            screen_height,
            score: 0,
            steps: 0,
            done: false,
        }
    }

    /// The food item that will reach the bird's column first
    pub fn nearest_food(&self) -> Option<&Food> {
        self.foods
            .iter()
            .min_by(|a, b| a.rect.left.total_cmp(&b.rect.left))
    }
}
