/*!
# Tree

Turns a filtered, ordered package list into the flattened forest the
package browser renders.

```text
(root)
├─ Tools                 group
│  ├─ Net                group
│  │  └─ P3
│  └─ UI                 group
│     ├─ P1
│     │  └─ P1 Samples   sub-package, parent re-inserted if filtered out
│     └─ P2
└─ Starter Bundle
   └─ Physics            bundle member
```

Sub-packages always follow their parent directly, even when the filter
only matched the child: missing parents are pulled from the full package
set. Group and bundle member nodes get negative ids below every package id,
as does every repeat of a package that tag grouping lists more than once, so
node ids are unique within a tree.

[`materialize`] is a pure function. [`MaterializedView`] caches its output
until something invalidates it.
*/

mod grouping;
mod materialize;
mod node;
mod view;

pub use grouping::{Grouping, NONE_GROUP};
pub use materialize::materialize;
pub use node::{NodeKind, ROOT_ID, Tree, TreeNode};
pub use view::{InvalidationReason, MaterializedView};
