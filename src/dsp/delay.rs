use std::collections::VecDeque;

use tracing::debug;

use crate::{
    dsp::node::{flag, from_flag, Parameterized},
    MAX_DELAY_SAMPLES,
};

/*
Feedback Delay
==============

The line is a queue of past outputs: new samples are pushed at the back,
the delayed tap is read `delay_length` samples from the back.

    index   = len - delay_length        (wrapped forward by len if negative)
    delayed = buffer[index]
    push      input + feedback * delayed
    output  = input * (1 - feedback) + delayed * feedback

The buffer starts at `delay_length` zeros and grows by one sample per call
until it holds 2 * delay_length samples; from then on the oldest sample is
dropped every call. The chorus reads this same buffer, so its history keeps
the extra headroom beyond the delay tap.

Capacity for the longest line is reserved up front, so processing and
length changes never allocate on the audio thread.
*/

pub const MAX_FEEDBACK: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayParam {
    Enabled,
    Feedback,
    /// Delay length in samples
    Length,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DelaySnapshot {
    pub feedback: f32,
    pub delay_length: usize,
    pub buffer_len: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Delay {
    buffer: VecDeque<f32>,
    delay_length: usize,
    feedback: f32,
    enabled: bool,
}

impl Delay {
    pub fn new(delay_length: usize, feedback: f32) -> Self {
        let delay_length = clamp_length(delay_length);
        let mut buffer = VecDeque::with_capacity(2 * MAX_DELAY_SAMPLES + 1);
        buffer.resize(delay_length, 0.0);

        Self {
            buffer,
            delay_length,
            feedback: clamp_feedback(feedback),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn process(&mut self, input: f32) -> f32 {
        if !self.enabled {
            return input;
        }

        let len = self.buffer.len() as isize;
        let index = (len - self.delay_length as isize).rem_euclid(len) as usize;
        let delayed = self.buffer[index];

        self.buffer.push_back(input + self.feedback * delayed);
        while self.buffer.len() > 2 * self.delay_length {
            self.buffer.pop_front();
        }

        input * (1.0 - self.feedback) + delayed * self.feedback
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Change the tap position. The buffer is zero-padded at the front when
    /// it is shorter than the new length and trimmed to twice the length.
    pub fn set_delay_length(&mut self, delay_length: usize) {
        let delay_length = clamp_length(delay_length);
        if delay_length == self.delay_length {
            return;
        }

        debug!(
            from = self.delay_length,
            to = delay_length,
            "delay length changed"
        );
        self.delay_length = delay_length;

        if self.buffer.len() < delay_length {
            resize_front(&mut self.buffer, delay_length);
        } else if self.buffer.len() > 2 * delay_length {
            resize_front(&mut self.buffer, 2 * delay_length);
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = clamp_feedback(feedback);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn delay_length(&self) -> usize {
        self.delay_length
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// History shared with the chorus, oldest sample first.
    pub fn buffer(&self) -> &VecDeque<f32> {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.resize(self.delay_length, 0.0);
    }

    pub fn snapshot(&self) -> DelaySnapshot {
        DelaySnapshot {
            feedback: self.feedback,
            delay_length: self.delay_length,
            buffer_len: self.buffer.len(),
            enabled: self.enabled,
        }
    }
}

impl Parameterized for Delay {
    type Param = DelayParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            DelayParam::Enabled => from_flag(self.enabled),
            DelayParam::Feedback => self.feedback,
            DelayParam::Length => self.delay_length as f32,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            DelayParam::Enabled => self.enabled = flag(value),
            DelayParam::Feedback => self.set_feedback(value),
            DelayParam::Length => self.set_delay_length(length_from_value(value)),
        }
    }
}

/// Grow or shrink `buffer` to `len`, keeping the newest samples at the back
/// and padding with zeros at the front.
pub(crate) fn resize_front(buffer: &mut VecDeque<f32>, len: usize) {
    if buffer.len() > len {
        let excess = buffer.len() - len;
        buffer.drain(..excess);
    }
    while buffer.len() < len {
        buffer.push_front(0.0);
    }
}

pub(crate) fn clamp_length(samples: usize) -> usize {
    samples.clamp(1, MAX_DELAY_SAMPLES)
}

/// Convert a parameter value to a sample count (NaN and negatives become 1).
pub(crate) fn length_from_value(value: f32) -> usize {
    clamp_length(value.round().max(1.0) as usize)
}

fn clamp_feedback(feedback: f32) -> f32 {
    if feedback.is_nan() {
        return 0.0;
    }
    feedback.clamp(0.0, MAX_FEEDBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_reads_silence_and_grows_by_one() {
        let mut delay = Delay::new(500, 0.5);
        assert_eq!(delay.buffer().len(), 500);

        let out = delay.process(1.0);
        assert_eq!(out, 0.5);
        assert_eq!(delay.buffer().len(), 501);
        assert_eq!(delay.buffer().back().copied(), Some(1.0));
    }

    #[test]
    fn echo_arrives_after_delay_length() {
        let mut delay = Delay::new(10, 0.5);
        delay.process(1.0);
        for _ in 0..9 {
            assert_eq!(delay.process(0.0), 0.0);
        }
        // delayed = 1.0, output = 0 * 0.5 + 1.0 * 0.5
        assert_eq!(delay.process(0.0), 0.5);
    }

    #[test]
    fn buffer_is_capped_at_twice_the_length() {
        let mut delay = Delay::new(100, 0.3);
        for i in 0..1_000 {
            delay.process((i as f32 * 0.01).sin());
            assert!(delay.buffer().len() <= 200);
        }
        assert_eq!(delay.buffer().len(), 200);
    }

    #[test]
    fn feedback_is_clamped() {
        let mut delay = Delay::new(10, 5.0);
        assert_eq!(delay.feedback(), MAX_FEEDBACK);
        delay.set_param(DelayParam::Feedback, -1.0);
        assert_eq!(delay.feedback(), 0.0);
    }

    #[test]
    fn disabled_delay_is_identity() {
        let mut delay = Delay::new(10, 0.5).with_enabled(false);
        for x in [0.25f32, -0.75, 1e-30] {
            assert_eq!(delay.process(x).to_bits(), x.to_bits());
        }
        assert_eq!(delay.buffer().len(), 10);
    }

    #[test]
    fn length_change_keeps_index_in_bounds() {
        let mut delay = Delay::new(50, 0.5);
        for _ in 0..80 {
            delay.process(0.5);
        }

        delay.set_delay_length(5_000);
        assert!(delay.buffer().len() >= 5_000);
        for _ in 0..100 {
            assert!(delay.process(0.1).is_finite());
        }

        delay.set_delay_length(3);
        assert!(delay.buffer().len() <= 6);
        for _ in 0..100 {
            assert!(delay.process(0.1).is_finite());
        }
    }

    #[test]
    fn resize_front_keeps_newest() {
        let mut buffer: VecDeque<f32> = [1.0, 2.0, 3.0].into_iter().collect();
        resize_front(&mut buffer, 5);
        assert_eq!(buffer, [0.0, 0.0, 1.0, 2.0, 3.0]);
        resize_front(&mut buffer, 2);
        assert_eq!(buffer, [2.0, 3.0]);
    }
}
