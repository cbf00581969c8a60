//! Status page
//!
//! Rendering is a pure function of the session; the server sends whatever this
//! returns, for every request.

use crate::session::SessionState;
use alloc::string::String;
use core::fmt::Write;

/// Render the control page for the given session
pub fn render(state: &SessionState) -> String {
    let mut html = String::with_capacity(1024);
    // Writing into a String cannot fail.
    let _ = write_page(&mut html, state);
    html
}

fn write_page(out: &mut impl Write, state: &SessionState) -> core::fmt::Result {
    out.write_str(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>EMDR Lightbar</title>\n\
         </head>\n\
         <body style=\"font-family:Arial;text-align:center;\">\n\
         <h2>EMDR Lightbar</h2>\n\n",
    )?;

    writeln!(out, "<p><b>Mode:</b> {}</p>", state.mode.label())?;
    writeln!(out, "<p><b>Speed:</b> {} ms</p>", state.speed_ms)?;
    match state.limit() {
        Some(limit) => writeln!(out, "<p><b>Cycle limit:</b> {limit}</p>")?,
        None => writeln!(out, "<p><b>Cycle limit:</b> Unlimited</p>")?,
    }

    out.write_str(
        "\n<p>\n\
         <a href=\"/?mode=on\"><button>START</button></a>\n\
         <a href=\"/?mode=off\"><button>STOP</button></a>\n\
         </p>\n\n\
         <form>\n\
         <input type=\"hidden\" name=\"mode\" value=\"on\">\n",
    )?;
    writeln!(
        out,
        "<p>Speed (ms): <input type=\"number\" name=\"speed\" value=\"{}\"></p>",
        state.speed_ms
    )?;
    writeln!(
        out,
        "<p>Cycles (0 = unlimited): <input type=\"number\" name=\"limit\" value=\"{}\"></p>",
        state.cycle_limit
    )?;
    out.write_str(
        "<input type=\"submit\" value=\"Set & Start\">\n\
         </form>\n\
         </body>\n\
         </html>\n",
    )
}
