//! Chain → link extraction.
//!
//! Every chain contributes one link per member whose position differs from
//! the chain's representative position. Links always point
//! representative → member; equal positions (self-pairs, or members that
//! duplicate the representative's position) never produce a link.

use coreflink_core::{ChainMap, CorefChain, Document, Link};

/// Links for a single chain.
///
/// Empty for chains with fewer than two members or with no designated
/// representative.
///
/// ```rust
/// use coreflink::links::chain_links;
/// use coreflink_core::{CorefChain, CorefMention, Link, MentionPosition};
///
/// let rep = CorefMention::new(1, 7, MentionPosition::new(0, 1, 2));
/// let member = CorefMention::new(2, 7, MentionPosition::new(0, 2, 3));
/// let chain = CorefChain::new(7, vec![rep.clone(), member]).with_representative(rep);
///
/// assert_eq!(
///     chain_links(&chain),
///     vec![Link::new(MentionPosition::new(0, 1, 2), MentionPosition::new(0, 2, 3))]
/// );
/// ```
#[must_use]
pub fn chain_links(chain: &CorefChain) -> Vec<Link> {
    if chain.len() < 2 {
        return Vec::new();
    }
    let Some(representative) = chain.representative_position() else {
        log::debug!(
            "chain {} has no representative, skipping links",
            chain.cluster_id
        );
        return Vec::new();
    };

    let mut links: Vec<Link> = Vec::with_capacity(chain.len() - 1);
    for mention in &chain.mentions {
        if mention.position == representative {
            continue;
        }
        let link = Link::new(representative, mention.position);
        // Members repeating a position would otherwise repeat the link.
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

/// Links for every chain in a cluster map, in cluster ID order.
///
/// `None` maps and `None` chain entries contribute nothing.
#[must_use]
pub fn get_links(chains: Option<&ChainMap>) -> Vec<Link> {
    let Some(chains) = chains else {
        return Vec::new();
    };
    chains
        .values()
        .flatten()
        .flat_map(chain_links)
        .collect()
}

/// Links for the chains a document carries.
#[must_use]
pub fn links_for(document: &Document) -> Vec<Link> {
    get_links(document.coref_chains.as_ref())
}
