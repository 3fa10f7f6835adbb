/*!
    Selection of the audio packet source.
*/

/**
    Where the next audio packet is decoded from.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioRoute {
    /// Pull a packet from the separate audio source.
    Secondary,
    /// Decode the packet read from the video container.
    Primary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RouterState {
    SecondaryActive,
    /// The separate source ran dry; it never becomes active again.
    SecondaryExhausted,
    PrimaryOnly,
}

/**
    Routes audio between the separate audio source and the video
    container's own audio stream.

    Starts on the separate source when there is one. Once that source fails
    to deliver a packet, every later audio packet comes from the video
    container, starting with the one that triggered the pull.
*/
#[derive(Clone, Copy, Debug)]
pub struct AudioRouter {
    state: RouterState,
}

impl AudioRouter {
    pub fn new(has_secondary: bool) -> Self {
        let state = if has_secondary {
            RouterState::SecondaryActive
        } else {
            RouterState::PrimaryOnly
        };
        Self { state }
    }

    pub fn route(&self) -> AudioRoute {
        match self.state {
            RouterState::SecondaryActive => AudioRoute::Secondary,
            RouterState::SecondaryExhausted | RouterState::PrimaryOnly => AudioRoute::Primary,
        }
    }

    /**
        Record that the separate source could not deliver a packet.

        Returns true only on the first call, when the switch happens.
    */
    pub fn mark_secondary_exhausted(&mut self) -> bool {
        if self.state == RouterState::SecondaryActive {
            self.state = RouterState::SecondaryExhausted;
            true
        } else {
            false
        }
    }

    /// True once the separate source has run dry.
    pub fn secondary_exhausted(&self) -> bool {
        self.state == RouterState::SecondaryExhausted
    }
}
