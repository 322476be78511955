//! Scripts evaluated inside candidate pages.
//!
//! Every callback goes through `window.ReelhoundBridge`, which the render
//! surface exposes and forwards to [`SurfaceContext::bridge_call`](super::SurfaceContext::bridge_call).

/// Name of the global object scripts call back into.
pub const BRIDGE: &str = "ReelhoundBridge";

/// Attaches a `playing` listener to the first media element, polling until
/// one appears.
pub const PLAYING_LISTENER: &str = "\
(function() {\
  var tries = 0;\
  var timer = setInterval(function() {\
    var v = document.querySelector('video');\
    if (v && !v.__reelhoundWatched) {\
      v.__reelhoundWatched = true;\
      v.addEventListener('playing', function() {\
        var b = window.ReelhoundBridge; if (b) { b.videoStarted(); }\
      });\
      if (!v.paused && v.currentTime > 0) {\
        var b = window.ReelhoundBridge; if (b) { b.videoStarted(); }\
      }\
      clearInterval(timer);\
    }\
    if (++tries > 60) { clearInterval(timer); }\
  }, 500);\
})();";

/// Looks for visible "not found" headings or the broken-video image.
pub const ERROR_CHECK: &str = "\
(function() {\
  var visible = false;\
  var img = document.querySelector('img[src*=\"no_video\"]');\
  if (img && img.offsetParent !== null) { visible = true; }\
  var h1 = document.querySelector('h1');\
  if (h1 && h1.offsetParent !== null && \
      (h1.innerText.indexOf('Not Found') !== -1 || h1.innerText.indexOf('File not found') !== -1)) {\
    visible = true;\
  }\
  if (visible) { var b = window.ReelhoundBridge; if (b) { b.errorDetected(); } }\
})();";

/// Reports the embed's "resume where you left off?" prompt.
pub const RESUME_DETECTOR: &str = "\
(function() {\
  var check = setInterval(function() {\
    var prompt = document.querySelector('#checkresume_div_n');\
    if (prompt) {\
      var span = document.querySelector('#lefttime');\
      var b = window.ReelhoundBridge;\
      if (b) { b.resumePromptDetected(span ? span.innerText : 'Unknown'); }\
      clearInterval(check);\
    }\
  }, 500);\
  setTimeout(function() { clearInterval(check); }, 5000);\
})();";

/// Clears click-through overlays and presses play, giving up after ~10 s.
pub const AUTOPLAY: &str = "\
(function() {\
  var attempts = 0;\
  var timer = setInterval(function() {\
    var v = document.querySelector('video');\
    if (v && !v.paused && v.currentTime > 0) { clearInterval(timer); return; }\
    var center = document.elementFromPoint(window.innerWidth / 2, window.innerHeight / 2);\
    if (center && center !== v) { center.click(); }\
    setTimeout(function() {\
      var btn = document.querySelector('.vjs-play-control') ||\
                document.querySelector('.jw-icon-play') ||\
                document.querySelector('button[aria-label=\"Play\"]') ||\
                document.querySelector('button[title=\"Play\"]');\
      if (btn) { btn.click(); } else if (v && v.paused) { v.muted = false; v.play(); }\
    }, 300);\
    if (++attempts > 20) { clearInterval(timer); }\
  }, 500);\
})();";

/// Toggles the first media element and reports the new state.
pub const TOGGLE_PLAY_PAUSE: &str = "\
(function() {\
  var v = document.querySelector('video');\
  if (!v) { return; }\
  var b = window.ReelhoundBridge;\
  if (v.paused) { v.play(); if (b) { b.playPauseToggled('play'); } }\
  else { v.pause(); if (b) { b.playPauseToggled('pause'); } }\
})();";

/// Move the playhead by `seconds` (negative seeks backwards).
#[must_use]
pub fn seek(seconds: i32) -> String {
    format!(
        "(function() {{ var v = document.querySelector('video'); \
         if (v) {{ v.currentTime = Math.max(0, v.currentTime + ({seconds})); }} }})();"
    )
}

/// Answer the embed's resume prompt.
#[must_use]
pub fn answer_resume(resume: bool) -> String {
    let button = if resume { "#yesplease" } else { "#no_thanks" };
    format!(
        "(function() {{ var btn = document.querySelector('{button}'); if (btn) {{ btn.click(); }} }})();"
    )
}
