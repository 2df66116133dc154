/*!
 * Synchronization Primitives
 *
 * Blocking building blocks for the wait path:
 * - `WaitCell`: one-shot consumable notification a single wait blocks on
 * - `WaitSet`: per-object registry of live cells, woken on every mutation
 *
 * # Architecture
 *
 * Every blocking wait owns exactly one `WaitCell`; producers and chain
 * mutations never block, they only flip cell flags and notify. The cell's
 * flag is sticky until consumed, so a notification landing between a gate
 * re-evaluation and the subsequent sleep is never lost.
 *
 * # Performance
 *
 * - One condvar + one small mutex per in-flight wait, nothing global
 * - Registration via `Weak` so abandoned waits cost one prune, not a leak
 * - Wake paths take the set lock only to snapshot the live cells
 */

mod cell;
mod set;

pub use cell::WaitCell;
pub use set::WaitSet;
