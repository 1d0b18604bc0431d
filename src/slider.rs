//! Radial slider interaction model
//!
//! Maps pointer positions around a circular track to a bounded value and
//! back. 0° is at the top of the track and angles grow clockwise; a full
//! turn spans the whole `[min, max]` range. Rendering is left to the host
//! toolkit.

use std::f64::consts::PI;
use std::fmt;

use crate::constants::{
    SLIDER_DEFAULT_MAX_JUMP, SLIDER_DEFAULT_WIDGET_SIZE, SLIDER_MAX_WIDGET_SIZE,
    SLIDER_MIN_WIDGET_SIZE,
};

/// Discrete scroll input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SliderError {
    #[error("Value {value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Invalid slider range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

type ValueObserver = Box<dyn FnMut(f64)>;

/// Value/angle state of one circular control
pub struct RadialSlider {
    min: f64,
    max: f64,
    /// Rounding granularity for pointer input (0 disables rounding)
    step: f64,
    /// Change per scroll notch
    page_increment: f64,
    value: f64,
    /// Knob position in degrees
    angle: f64,
    /// Value units per degree
    map_slope: f64,
    /// Pointer updates moving the knob this far or more are ignored
    max_jump: f64,
    widget_size: f64,
    observers: Vec<ValueObserver>,
}

impl RadialSlider {
    /// Slider over `[min, max]` starting at `min`
    pub fn new(min: f64, max: f64, step: f64, page_increment: f64) -> Result<Self, SliderError> {
        check_range(min, max)?;

        Ok(Self {
            min,
            max,
            step,
            page_increment,
            value: min,
            angle: 0.0,
            map_slope: (max - min) / 360.0,
            max_jump: SLIDER_DEFAULT_MAX_JUMP,
            widget_size: SLIDER_DEFAULT_WIDGET_SIZE,
            observers: Vec::new(),
        })
    }

    /// Width and height of the square control, clamped to the supported sizes
    pub fn with_widget_size(mut self, size: f64) -> Self {
        self.widget_size = size.clamp(SLIDER_MIN_WIDGET_SIZE, SLIDER_MAX_WIDGET_SIZE);
        self
    }

    /// Largest knob movement (degrees) accepted from one pointer update
    pub fn with_max_jump(mut self, degrees: f64) -> Self {
        self.max_jump = degrees;
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn map_slope(&self) -> f64 {
        self.map_slope
    }

    pub fn widget_size(&self) -> f64 {
        self.widget_size
    }

    /// Pointer coordinate of the track centre (both axes)
    pub fn center(&self) -> f64 {
        self.widget_size / 2.0
    }

    /// Call `observer` with the new value after every accepted change
    pub fn connect_value_changed<F>(&mut self, observer: F)
    where
        F: FnMut(f64) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Change the bounds; the current value is clamped into the new range
    pub fn set_range(&mut self, min: f64, max: f64) -> Result<(), SliderError> {
        check_range(min, max)?;

        self.min = min;
        self.max = max;
        self.map_slope = (max - min) / 360.0;
        let value = self.value.clamp(min, max);
        self.update(value);
        Ok(())
    }

    /// Set the value directly. Values outside `[min, max]` are rejected.
    pub fn set_value(&mut self, value: f64) -> Result<(), SliderError> {
        if !(self.min..=self.max).contains(&value) {
            return Err(SliderError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }

        self.update(value);
        Ok(())
    }

    /// Knob angle for a value
    pub fn angle_for_value(&self, value: f64) -> f64 {
        (value - self.min) / self.map_slope
    }

    /// Value for a knob angle, rounded to the step
    pub fn value_for_angle(&self, angle: f64) -> f64 {
        round_by(self.min + self.map_slope * angle, self.step).max(self.min)
    }

    /// Angle of a pointer position relative to the widget origin
    pub fn pointer_angle(&self, x: f64, y: f64) -> f64 {
        let center = self.center();
        let angle = -(x - center).atan2(y - center) * (180.0 / PI) + 180.0;
        angle.rem_euclid(360.0)
    }

    /// Handle pointer motion; returns whether the value was updated.
    ///
    /// Moves that jump the knob by `max_jump` degrees or more (crossing the
    /// 0/360 seam) are ignored, as are moves that would land on `max`.
    pub fn pointer_motion(&mut self, x: f64, y: f64) -> bool {
        let angle = self.pointer_angle(x, y);
        let candidate = self.value_for_angle(angle);

        // NOTE: strict bound means dragging never reaches `max`; scrolling
        // and set_value still can. The bound is checked after step rounding,
        // so a drag that would round up to `max` is rejected as well.
        if (angle - self.angle).abs() >= self.max_jump || candidate >= self.max {
            return false;
        }

        self.angle = angle;
        self.value = candidate;
        self.notify();
        true
    }

    /// Handle one scroll notch; returns whether the value changed
    pub fn scroll(&mut self, direction: ScrollDirection) -> bool {
        let delta = match direction {
            ScrollDirection::Up => self.page_increment,
            ScrollDirection::Down => -self.page_increment,
        };

        let value = (self.value + delta).clamp(self.min, self.max);
        if value == self.value {
            return false;
        }

        self.update(value);
        true
    }

    fn update(&mut self, value: f64) {
        let changed = value != self.value;
        self.value = value;
        self.angle = self.angle_for_value(value);
        if changed {
            self.notify();
        }
    }

    fn notify(&mut self) {
        let value = self.value;
        for observer in &mut self.observers {
            observer(value);
        }
    }
}

impl fmt::Debug for RadialSlider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadialSlider")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("step", &self.step)
            .field("page_increment", &self.page_increment)
            .field("value", &self.value)
            .field("angle", &self.angle)
            .field("max_jump", &self.max_jump)
            .field("widget_size", &self.widget_size)
            .finish_non_exhaustive()
    }
}

fn check_range(min: f64, max: f64) -> Result<(), SliderError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(SliderError::InvalidRange { min, max })
    }
}

/// Nearest multiple of `by`; exact ties go to the lower multiple
fn round_by(n: f64, by: f64) -> f64 {
    if by <= 0.0 {
        return n;
    }
    let lower = (n / by).floor() * by;
    let upper = lower + by;
    if n - lower > upper - n {
        upper
    } else {
        lower
    }
}
