//! Attack limiters - policies deciding whether a skill may fire right now

use crate::cooldown::Cooldown;

/// Gate in front of every skill execution.
///
/// State only changes through [`AttackLimiter::on_executed`] and the passage
/// of time in [`AttackLimiter::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttackLimiter {
    /// No limit at all (basic attacks are paced by their animation)
    Unlimited,
    /// Ready whenever the cooldown is
    TimedCooldown(Cooldown),
    /// `free_casts` executions without cooldown. Once they are spent the next
    /// attempt arms the cooldown instead of executing, and the free casts come
    /// back when that cooldown completes.
    FreeNThenCooldown {
        free_casts: u32,
        remaining: u32,
        cooldown: Cooldown,
    },
}

impl AttackLimiter {
    pub fn timed(total_time: f32) -> Self {
        Self::TimedCooldown(Cooldown::new(total_time))
    }

    pub fn free_n_then_cooldown(free_casts: u32, total_time: f32) -> Self {
        Self::FreeNThenCooldown {
            free_casts,
            remaining: free_casts,
            cooldown: Cooldown::new(total_time),
        }
    }

    pub fn can_execute_now(&self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::TimedCooldown(cooldown) => cooldown.is_ready(),
            Self::FreeNThenCooldown { remaining, .. } => *remaining > 0,
        }
    }

    /// Record an execution. Free casts are spent before the cooldown.
    pub fn on_executed(&mut self) {
        match self {
            Self::Unlimited => {}
            Self::TimedCooldown(cooldown) => cooldown.start(),
            Self::FreeNThenCooldown {
                free_casts,
                remaining,
                cooldown,
            } => {
                if *remaining > 0 {
                    *remaining -= 1;
                } else {
                    cooldown.start();
                    refill_if_ready(cooldown, remaining, *free_casts);
                }
            }
        }
    }

    /// Record an attempt that `can_execute_now` refused. With the free casts
    /// spent and the cooldown idle, this starts the cooldown.
    pub fn on_rejected(&mut self) {
        if let Self::FreeNThenCooldown {
            free_casts,
            remaining,
            cooldown,
        } = self
        {
            if *remaining == 0 && cooldown.is_ready() {
                cooldown.start();
                refill_if_ready(cooldown, remaining, *free_casts);
            }
        }
    }

    /// Advance the owned cooldown, refilling free casts when it completes
    pub fn update(&mut self, delta: f32) {
        match self {
            Self::Unlimited => {}
            Self::TimedCooldown(cooldown) => {
                cooldown.tick(delta);
            }
            Self::FreeNThenCooldown {
                free_casts,
                remaining,
                cooldown,
            } => {
                if cooldown.tick(delta) && *remaining == 0 {
                    *remaining = *free_casts;
                }
            }
        }
    }

    pub fn cooldown(&self) -> Option<&Cooldown> {
        match self {
            Self::Unlimited => None,
            Self::TimedCooldown(cooldown) | Self::FreeNThenCooldown { cooldown, .. } => {
                Some(cooldown)
            }
        }
    }

    /// Change the cooldown duration; the running countdown is left alone
    pub fn set_cooldown_total(&mut self, total_time: f32) {
        match self {
            Self::Unlimited => {}
            Self::TimedCooldown(cooldown) | Self::FreeNThenCooldown { cooldown, .. } => {
                cooldown.set_total_time(total_time)
            }
        }
    }

    /// Change how many free casts a full refill grants. Casts already spent
    /// stay spent; a lowered limit clamps the remaining count.
    pub fn set_free_casts(&mut self, casts: u32) {
        if let Self::FreeNThenCooldown {
            free_casts,
            remaining,
            ..
        } = self
        {
            *remaining = (*remaining).min(casts);
            *free_casts = casts;
        }
    }

    /// Free casts left before the cooldown applies
    pub fn free_casts_remaining(&self) -> Option<u32> {
        match self {
            Self::FreeNThenCooldown { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }
}

/// A zero-length cooldown completes the moment it is armed, so `tick` never
/// reports the transition. Refill straight away in that case.
fn refill_if_ready(cooldown: &Cooldown, remaining: &mut u32, free_casts: u32) {
    if cooldown.is_ready() {
        *remaining = free_casts;
    }
}
