//! Header writer: the opening line of a profile or hat block.

use profile_types::ProfileNode;

use crate::error::WriterResult;
use crate::hat_tree::ProfileWriter;
use crate::sections::indent;

impl ProfileWriter<'_> {
    /// Render the opening brace line for `node`, displayed as `name`.
    ///
    /// A standalone profile gets the `profile` keyword unless its name is a
    /// path; an embedded hat gets it unless its name carries the `^` prefix.
    /// An attachment or an explicit keyword request always forces it.
    pub fn write_header(
        &self,
        node: &ProfileNode,
        depth: usize,
        name: &str,
        embedded_hat: bool,
    ) -> WriterResult<Vec<String>> {
        let quoted = self.quoter().quote(name)?;

        let implicit = if embedded_hat {
            name.starts_with('^')
        } else {
            quoted.starts_with('/') || quoted.starts_with("\"/")
        };

        let mut line = indent(depth);
        if !implicit || node.attachment.is_some() || node.profile_keyword {
            line.push_str("profile ");
        }
        line.push_str(&quoted);

        if let Some(attachment) = &node.attachment {
            line.push(' ');
            line.push_str(&self.quoter().quote(attachment)?);
        }

        if self.include_flags() && !node.flags.is_empty() {
            line.push_str(&format!(" flags=({})", node.flags));
        }

        line.push_str(" {");

        if let Some(comment) = &node.header_comment {
            line.push(' ');
            line.push_str(comment);
        }

        Ok(vec![line])
    }
}
