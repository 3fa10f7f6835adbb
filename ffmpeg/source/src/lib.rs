/*!
    Input containers and their decoders for the videncode ffmpeg crates.

    A [`MediaSource`] is one opened input container together with a ready
    decoder for each of its audio and video streams. [`Sources`] holds the
    mandatory video source and describes, through [`AudioPlan`], where the
    audio for the output comes from.

    # Example

    ```ignore
    use ffmpeg_source::{AudioPlan, Sources};

    let mut sources = Sources::open("clip.avi".as_ref(), Some("music.sox".as_ref()))?;

    let mut packet = ffmpeg_next::Packet::empty();
    while sources.video.read_packet(&mut packet).is_ok() {
        match sources.video.role_of(&packet) {
            Some(role) => { /* decode through the matching StreamContext */ }
            None => continue,
        }
    }
    ```
*/

pub use ffmpeg_types::{OpenError, ReadError, StreamRole};

mod input;
mod plan;
mod source;

pub use plan::{AudioPlan, Sources};
pub use source::{MediaSource, StreamContext};
